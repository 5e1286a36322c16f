//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnetwork::IpNetwork;
use ocprobe_otg::model::{
    Device, Ethernet, EthernetConnection, Ipv4Address, Ipv6Address,
};

// Addressing of one end of a point-to-point link.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Attributes {
    pub name: &'static str,
    pub desc: &'static str,
    pub mac: Option<&'static str>,
    pub ipv4: Ipv4Addr,
    pub ipv4_len: u8,
    pub ipv6: Ipv6Addr,
    pub ipv6_len: u8,
    pub mtu: u16,
}

// DUT end of the IS-IS link.
pub const DUT_ISIS: Attributes = Attributes {
    name: "dutIsis",
    desc: "DUT to ATE IS-IS",
    mac: None,
    ipv4: Ipv4Addr::new(192, 0, 2, 1),
    ipv4_len: 30,
    ipv6: Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0x192, 0, 2, 1),
    ipv6_len: 126,
    mtu: 1500,
};

// ATE end of the IS-IS link.
pub const ATE_ISIS: Attributes = Attributes {
    name: "ate1",
    desc: "ATE to DUT IS-IS",
    mac: Some("02:00:01:01:01:01"),
    ipv4: Ipv4Addr::new(192, 0, 2, 2),
    ipv4_len: 30,
    ipv6: Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0x192, 0, 2, 2),
    ipv6_len: 126,
    mtu: 1500,
};

// DUT end of the traffic source link.
pub const DUT_TRAFFIC: Attributes = Attributes {
    name: "dutTraffic",
    desc: "DUT to ATE traffic",
    mac: None,
    ipv4: Ipv4Addr::new(192, 0, 2, 5),
    ipv4_len: 30,
    ipv6: Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0x192, 0, 2, 5),
    ipv6_len: 126,
    mtu: 1500,
};

// ATE end of the traffic source link.
pub const ATE_TRAFFIC: Attributes = Attributes {
    name: "ate2",
    desc: "ATE to DUT traffic",
    mac: Some("02:00:02:01:01:01"),
    ipv4: Ipv4Addr::new(192, 0, 2, 6),
    ipv4_len: 30,
    ipv6: Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0x192, 0, 2, 6),
    ipv6_len: 126,
    mtu: 1500,
};

// ===== impl Attributes =====

impl Attributes {
    // Interface addresses with their prefix lengths.
    pub fn networks(&self) -> Vec<IpNetwork> {
        [
            (IpAddr::from(self.ipv4), self.ipv4_len),
            (IpAddr::from(self.ipv6), self.ipv6_len),
        ]
        .into_iter()
        .filter_map(|(addr, len)| IpNetwork::new(addr, len).ok())
        .collect()
    }

    pub fn ethernet_name(&self) -> String {
        format!("{}.Eth", self.name)
    }

    pub fn ipv4_name(&self) -> String {
        format!("{}.IPv4", self.name)
    }

    pub fn ipv6_name(&self) -> String {
        format!("{}.IPv6", self.name)
    }

    // Builds the emulated device of this end of the link, attached to the
    // given ATE port and using `peer` as gateway.
    pub fn to_otg_device(&self, port_name: &str, peer: &Attributes) -> Device {
        Device {
            name: self.name.to_owned(),
            ethernets: vec![Ethernet {
                name: self.ethernet_name(),
                connection: EthernetConnection {
                    choice: "port_name".to_owned(),
                    port_name: port_name.to_owned(),
                },
                mac: self.mac.unwrap_or_default().to_owned(),
                mtu: self.mtu,
                ipv4_addresses: vec![Ipv4Address {
                    name: self.ipv4_name(),
                    address: self.ipv4.to_string(),
                    gateway: peer.ipv4.to_string(),
                    prefix: self.ipv4_len,
                }],
                ipv6_addresses: vec![Ipv6Address {
                    name: self.ipv6_name(),
                    address: self.ipv6.to_string(),
                    gateway: peer.ipv6.to_string(),
                    prefix: self.ipv6_len,
                }],
            }],
            isis: None,
        }
    }
}

// ===== unit tests =====
