//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};

use crate::path::Path;

// Ethernet interface with addresses on its first subinterface.
#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Interface {
    pub name: String,
    pub config: InterfaceConfig,
    #[serde(default)]
    pub subinterfaces: Subinterfaces,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct InterfaceConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub if_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub enabled: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Subinterfaces {
    #[serde(default, rename = "subinterface")]
    pub entries: Vec<Subinterface>,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Subinterface {
    pub index: u32,
    pub config: SubinterfaceConfig,
    #[serde(
        rename = "openconfig-if-ip:ipv4",
        skip_serializing_if = "Option::is_none"
    )]
    pub ipv4: Option<IpConfig>,
    #[serde(
        rename = "openconfig-if-ip:ipv6",
        skip_serializing_if = "Option::is_none"
    )]
    pub ipv6: Option<IpConfig>,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct SubinterfaceConfig {
    pub index: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct IpConfig {
    #[serde(default)]
    pub config: IpEnabledConfig,
    #[serde(default)]
    pub addresses: Addresses,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct IpEnabledConfig {
    pub enabled: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Addresses {
    #[serde(default, rename = "address")]
    pub entries: Vec<Address>,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Address {
    pub ip: String,
    pub config: AddressConfig,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AddressConfig {
    pub ip: String,
    pub prefix_length: u8,
}

// ===== impl Interface =====

impl Interface {
    // Creates an enabled ethernet interface with the given addresses on
    // subinterface 0.
    pub fn ethernet(
        name: &str,
        description: Option<&str>,
        addrs: &[IpNetwork],
    ) -> Interface {
        let mut ipv4 = None;
        let mut ipv6 = None;
        for addr in addrs {
            let ip_config = match addr {
                IpNetwork::V4(_) => ipv4.get_or_insert_with(IpConfig::default),
                IpNetwork::V6(_) => ipv6.get_or_insert_with(IpConfig::default),
            };
            ip_config.addresses.entries.push(Address {
                ip: addr.ip().to_string(),
                config: AddressConfig {
                    ip: addr.ip().to_string(),
                    prefix_length: addr.prefix(),
                },
            });
        }

        Interface {
            name: name.to_owned(),
            config: InterfaceConfig {
                name: name.to_owned(),
                if_type: "iana-if-type:ethernetCsmacd".to_owned(),
                description: description.map(str::to_owned),
                enabled: true,
            },
            subinterfaces: Subinterfaces {
                entries: vec![Subinterface {
                    index: 0,
                    config: SubinterfaceConfig { index: 0 },
                    ipv4,
                    ipv6,
                }],
            },
        }
    }
}

// ===== impl IpEnabledConfig =====

impl Default for IpEnabledConfig {
    fn default() -> IpEnabledConfig {
        IpEnabledConfig { enabled: true }
    }
}

// ===== global functions =====

// Path of an interface.
pub fn path(name: &str) -> Path {
    Path::root()
        .elem("interfaces")
        .keyed("interface", [("name", name.to_owned())])
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use const_addrs::{ip4, ip6};

    use super::*;

    #[test]
    fn ethernet() {
        let addrs = [
            IpNetwork::new(ip4!("192.0.2.1").into(), 30).unwrap(),
            IpNetwork::new(ip6!("2001:db8::1").into(), 126).unwrap(),
        ];
        let iface = Interface::ethernet("port1", Some("DUT to ATE"), &addrs);
        let value = serde_json::to_value(&iface).unwrap();
        let subif = &value["subinterfaces"]["subinterface"][0];
        assert_eq!(
            subif["openconfig-if-ip:ipv4"]["addresses"]["address"][0]["config"]
                ["prefix-length"],
            30
        );
        assert_eq!(
            subif["openconfig-if-ip:ipv6"]["addresses"]["address"][0]["ip"],
            "2001:db8::1"
        );
        assert_eq!(value["config"]["type"], "iana-if-type:ethernetCsmacd");
    }
}
