//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use std::borrow::Cow;
use std::net::IpAddr;

use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};

use crate::yang::{ToYang, TryFromYang, strip_module_prefix};

// Address family, as defined by the openconfig-types module.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

// Extension methods for IpAddr.
pub trait IpAddrExt {
    // Returns the address family of this address.
    fn address_family(&self) -> AddressFamily;
}

// Extension methods for IpNetwork.
pub trait IpNetworkExt {
    // Returns the address family of this network.
    fn address_family(&self) -> AddressFamily;

    // Returns the prefix in its "address/length" textual form.
    fn to_cidr(&self) -> String;
}

// ===== impl AddressFamily =====

impl AddressFamily {
    // Returns the other address family.
    pub fn other(&self) -> AddressFamily {
        match self {
            AddressFamily::Ipv4 => AddressFamily::Ipv6,
            AddressFamily::Ipv6 => AddressFamily::Ipv4,
        }
    }
}

impl std::fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressFamily::Ipv4 => write!(f, "IPV4"),
            AddressFamily::Ipv6 => write!(f, "IPV6"),
        }
    }
}

impl ToYang for AddressFamily {
    fn to_yang(&self) -> Cow<'static, str> {
        match self {
            AddressFamily::Ipv4 => "openconfig-types:IPV4".into(),
            AddressFamily::Ipv6 => "openconfig-types:IPV6".into(),
        }
    }
}

impl TryFromYang for AddressFamily {
    fn try_from_yang(identity: &str) -> Option<AddressFamily> {
        match strip_module_prefix(identity) {
            "IPV4" => Some(AddressFamily::Ipv4),
            "IPV6" => Some(AddressFamily::Ipv6),
            _ => None,
        }
    }
}

// ===== impl IpAddr =====

impl IpAddrExt for IpAddr {
    fn address_family(&self) -> AddressFamily {
        match self {
            IpAddr::V4(_) => AddressFamily::Ipv4,
            IpAddr::V6(_) => AddressFamily::Ipv6,
        }
    }
}

// ===== impl IpNetwork =====

impl IpNetworkExt for IpNetwork {
    fn address_family(&self) -> AddressFamily {
        match self {
            IpNetwork::V4(_) => AddressFamily::Ipv4,
            IpNetwork::V6(_) => AddressFamily::Ipv6,
        }
    }

    fn to_cidr(&self) -> String {
        format!("{}/{}", self.network(), self.prefix())
    }
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use const_addrs::{ip4, ip6};

    use super::*;

    #[test]
    fn address_family_identities() {
        assert_eq!(AddressFamily::Ipv4.to_yang(), "openconfig-types:IPV4");
        assert_eq!(AddressFamily::Ipv6.to_yang_key(), "IPV6");
        assert_eq!(
            AddressFamily::try_from_yang("openconfig-types:IPV6"),
            Some(AddressFamily::Ipv6)
        );
        assert_eq!(
            AddressFamily::try_from_yang("IPV4"),
            Some(AddressFamily::Ipv4)
        );
        assert_eq!(AddressFamily::try_from_yang("L2VPN"), None);
        assert_eq!(AddressFamily::Ipv4.other(), AddressFamily::Ipv6);
    }

    #[test]
    fn network_cidr() {
        let v4 = IpNetwork::new(ip4!("192.168.10.0").into(), 24).unwrap();
        let v6 =
            IpNetwork::new(ip6!("2024:db8:128:128::").into(), 64).unwrap();
        assert_eq!(v4.to_cidr(), "192.168.10.0/24");
        assert_eq!(v6.to_cidr(), "2024:db8:128:128::/64");
        assert_eq!(v6.address_family(), AddressFamily::Ipv6);
    }
}
