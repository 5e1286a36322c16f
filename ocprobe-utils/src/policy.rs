//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use std::borrow::Cow;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ip::AddressFamily;
use crate::yang::{ToYang, TryFromYang, strip_module_prefix};

// Final disposition of a route matched by a policy statement.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum PolicyResult {
    #[serde(rename = "ACCEPT_ROUTE")]
    AcceptRoute,
    #[default]
    #[serde(rename = "REJECT_ROUTE")]
    RejectRoute,
}

// Behavior of a match statement.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum MatchSetOptions {
    // Match is true if given value matches any member of the defined set.
    #[default]
    #[serde(rename = "ANY")]
    Any,
    // Match is true if given value matches all members of the defined set.
    #[serde(rename = "ALL")]
    All,
    // Match is true if given value does not match any member of the defined
    // set.
    #[serde(rename = "INVERT")]
    Invert,
}

// Behavior of a match statement, restricted to ANY and INVERT.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum MatchSetOptionsRestricted {
    #[default]
    #[serde(rename = "ANY")]
    Any,
    #[serde(rename = "INVERT")]
    Invert,
}

// Address family of the prefixes in a prefix-set.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum PrefixSetMode {
    #[serde(rename = "IPV4")]
    Ipv4,
    #[serde(rename = "IPV6")]
    Ipv6,
    #[serde(rename = "MIXED")]
    Mixed,
}

// Range of mask lengths matched by a prefix-set entry.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum MaskLengthRange {
    // Only the mask length of the prefix itself.
    #[default]
    Exact,
    // Inclusive range of mask lengths.
    Range(u8, u8),
}

// ===== impl PolicyResult =====

impl std::fmt::Display for PolicyResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyResult::AcceptRoute => write!(f, "ACCEPT_ROUTE"),
            PolicyResult::RejectRoute => write!(f, "REJECT_ROUTE"),
        }
    }
}

impl ToYang for PolicyResult {
    fn to_yang(&self) -> Cow<'static, str> {
        self.to_string().into()
    }
}

impl TryFromYang for PolicyResult {
    fn try_from_yang(value: &str) -> Option<PolicyResult> {
        match strip_module_prefix(value) {
            "ACCEPT_ROUTE" => Some(PolicyResult::AcceptRoute),
            "REJECT_ROUTE" => Some(PolicyResult::RejectRoute),
            _ => None,
        }
    }
}

// ===== impl PrefixSetMode =====

impl From<AddressFamily> for PrefixSetMode {
    fn from(af: AddressFamily) -> PrefixSetMode {
        match af {
            AddressFamily::Ipv4 => PrefixSetMode::Ipv4,
            AddressFamily::Ipv6 => PrefixSetMode::Ipv6,
        }
    }
}

// ===== impl MaskLengthRange =====

impl std::fmt::Display for MaskLengthRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaskLengthRange::Exact => write!(f, "exact"),
            MaskLengthRange::Range(lower, upper) => {
                write!(f, "{lower}..{upper}")
            }
        }
    }
}

impl std::str::FromStr for MaskLengthRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "exact" {
            return Ok(MaskLengthRange::Exact);
        }

        let (lower, upper) = s
            .split_once("..")
            .ok_or_else(|| format!("invalid mask length range: {s}"))?;
        let lower = lower
            .parse::<u8>()
            .map_err(|_| format!("invalid lower mask length: {lower}"))?;
        let upper = upper
            .parse::<u8>()
            .map_err(|_| format!("invalid upper mask length: {upper}"))?;
        if lower > upper {
            return Err(format!("inverted mask length range: {s}"));
        }

        Ok(MaskLengthRange::Range(lower, upper))
    }
}

impl Serialize for MaskLengthRange {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MaskLengthRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ===== unit tests =====
