//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use std::borrow::Cow;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::yang::{ToYang, TryFromYang, strip_module_prefix};

// Routing protocols that can install or receive routes, as defined by the
// "INSTALL_PROTOCOL_TYPE" identity of the openconfig-policy-types module.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum InstallProtocol {
    BGP,
    DirectlyConnected,
    ISIS,
    LocalAggregate,
    OSPF,
    OSPF3,
    STATIC,
}

// ===== impl InstallProtocol =====

impl InstallProtocol {
    fn as_identity(&self) -> &'static str {
        match self {
            InstallProtocol::BGP => "BGP",
            InstallProtocol::DirectlyConnected => "DIRECTLY_CONNECTED",
            InstallProtocol::ISIS => "ISIS",
            InstallProtocol::LocalAggregate => "LOCAL_AGGREGATE",
            InstallProtocol::OSPF => "OSPF",
            InstallProtocol::OSPF3 => "OSPF3",
            InstallProtocol::STATIC => "STATIC",
        }
    }
}

impl std::fmt::Display for InstallProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_identity())
    }
}

impl FromStr for InstallProtocol {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InstallProtocol::try_from_yang(s).ok_or(())
    }
}

impl ToYang for InstallProtocol {
    fn to_yang(&self) -> Cow<'static, str> {
        format!("openconfig-policy-types:{}", self.as_identity()).into()
    }
}

impl TryFromYang for InstallProtocol {
    fn try_from_yang(identity: &str) -> Option<InstallProtocol> {
        match strip_module_prefix(identity) {
            "BGP" => Some(InstallProtocol::BGP),
            "DIRECTLY_CONNECTED" => Some(InstallProtocol::DirectlyConnected),
            "ISIS" => Some(InstallProtocol::ISIS),
            "LOCAL_AGGREGATE" => Some(InstallProtocol::LocalAggregate),
            "OSPF" => Some(InstallProtocol::OSPF),
            "OSPF3" => Some(InstallProtocol::OSPF3),
            "STATIC" => Some(InstallProtocol::STATIC),
            _ => None,
        }
    }
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identities() {
        assert_eq!(
            InstallProtocol::STATIC.to_yang(),
            "openconfig-policy-types:STATIC"
        );
        assert_eq!(InstallProtocol::ISIS.to_yang_key(), "ISIS");
        assert_eq!(
            "openconfig-policy-types:DIRECTLY_CONNECTED".parse(),
            Ok(InstallProtocol::DirectlyConnected)
        );
        assert!("RIP".parse::<InstallProtocol>().is_err());
    }
}
