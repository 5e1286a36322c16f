//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use derive_new::new;
use ipnetwork::IpNetwork;
use ocprobe_utils::ip::IpNetworkExt;
use ocprobe_utils::policy::{
    MaskLengthRange, MatchSetOptions, MatchSetOptionsRestricted,
    PolicyResult, PrefixSetMode,
};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::path::Path;

// Top-level routing policy container.
#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RoutingPolicy {
    #[serde(default, skip_serializing_if = "DefinedSets::is_empty")]
    pub defined_sets: DefinedSets,
    #[serde(default, skip_serializing_if = "PolicyDefinitions::is_empty")]
    pub policy_definitions: PolicyDefinitions,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DefinedSets {
    #[serde(default, skip_serializing_if = "PrefixSets::is_empty")]
    pub prefix_sets: PrefixSets,
    #[serde(default, skip_serializing_if = "TagSets::is_empty")]
    pub tag_sets: TagSets,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct PrefixSets {
    #[serde(default, rename = "prefix-set")]
    pub entries: Vec<PrefixSet>,
}

// List of IPv4 or IPv6 prefixes that are matched as part of a policy.
#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct PrefixSet {
    pub name: String,
    pub config: PrefixSetConfig,
    #[serde(default)]
    pub prefixes: Prefixes,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct PrefixSetConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<PrefixSetMode>,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Prefixes {
    #[serde(default, rename = "prefix")]
    pub entries: Vec<Prefix>,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Prefix {
    pub ip_prefix: String,
    pub masklength_range: MaskLengthRange,
    pub config: PrefixConfig,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PrefixConfig {
    pub ip_prefix: String,
    pub masklength_range: MaskLengthRange,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct TagSets {
    #[serde(default, rename = "tag-set")]
    pub entries: Vec<TagSet>,
}

// List of tags that can be matched in policies.
#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct TagSet {
    pub name: String,
    pub config: TagSetConfig,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TagSetConfig {
    pub name: String,
    #[serde(default)]
    pub tag_value: Vec<TagValue>,
}

// Route tag, either numeric or in hexadecimal string form.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(untagged)]
pub enum TagValue {
    Numeric(u32),
    Hex(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct PolicyDefinitions {
    #[serde(default, rename = "policy-definition")]
    pub entries: Vec<PolicyDefinition>,
}

// Policy definition.
#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct PolicyDefinition {
    pub name: String,
    pub config: PolicyDefinitionConfig,
    #[serde(default)]
    pub statements: Statements,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct PolicyDefinitionConfig {
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Statements {
    // Statements are evaluated in list order.
    #[serde(default, rename = "statement")]
    pub entries: Vec<Statement>,
}

// Policy statement.
#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Statement {
    pub name: String,
    pub config: StatementConfig,
    #[serde(default, skip_serializing_if = "Conditions::is_empty")]
    pub conditions: Conditions,
    #[serde(default)]
    pub actions: Actions,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct StatementConfig {
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Conditions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_prefix_set: Option<MatchPrefixSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_tag_set: Option<MatchTagSet>,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct MatchPrefixSet {
    pub config: MatchPrefixSetConfig,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct MatchPrefixSetConfig {
    pub prefix_set: String,
    pub match_set_options: MatchSetOptionsRestricted,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct MatchTagSet {
    pub config: MatchTagSetConfig,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct MatchTagSetConfig {
    pub tag_set: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_set_options: Option<MatchSetOptions>,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Actions {
    #[serde(default)]
    pub config: ActionsConfig,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ActionsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_result: Option<PolicyResult>,
}

// Prefix match of a route policy statement.
#[derive(Clone, Debug, Eq, PartialEq, new)]
pub struct PrefixMatch {
    pub prefix_set: String,
    pub prefix: IpNetwork,
    pub masklength_range: MaskLengthRange,
}

// Tag match of a route policy statement.
#[derive(Clone, Debug, Eq, PartialEq, new)]
pub struct TagMatch {
    pub tag_set: String,
    pub tag_value: u32,
}

// ===== impl RoutingPolicy =====

impl RoutingPolicy {
    pub fn policy_definition(&self, name: &str) -> Option<&PolicyDefinition> {
        self.policy_definitions
            .entries
            .iter()
            .find(|policy| policy.name == name)
    }

    pub fn policy_definition_mut(
        &mut self,
        name: &str,
    ) -> &mut PolicyDefinition {
        let entries = &mut self.policy_definitions.entries;
        let pos = match entries.iter().position(|policy| policy.name == name) {
            Some(pos) => pos,
            None => {
                entries.push(PolicyDefinition::new(name));
                entries.len() - 1
            }
        };
        &mut entries[pos]
    }
}

// ===== impl DefinedSets =====

impl DefinedSets {
    fn is_empty(&self) -> bool {
        self.prefix_sets.is_empty() && self.tag_sets.is_empty()
    }

    pub fn prefix_set(&self, name: &str) -> Option<&PrefixSet> {
        self.prefix_sets.entries.iter().find(|set| set.name == name)
    }

    pub fn prefix_set_mut(
        &mut self,
        name: &str,
        mode: PrefixSetMode,
    ) -> &mut PrefixSet {
        let entries = &mut self.prefix_sets.entries;
        let pos = match entries.iter().position(|set| set.name == name) {
            Some(pos) => pos,
            None => {
                entries.push(PrefixSet {
                    name: name.to_owned(),
                    config: PrefixSetConfig {
                        name: name.to_owned(),
                        mode: Some(mode),
                    },
                    prefixes: Default::default(),
                });
                entries.len() - 1
            }
        };
        &mut entries[pos]
    }

    pub fn tag_set(&self, name: &str) -> Option<&TagSet> {
        self.tag_sets.entries.iter().find(|set| set.name == name)
    }

    pub fn tag_set_mut(&mut self, name: &str) -> &mut TagSet {
        let entries = &mut self.tag_sets.entries;
        let pos = match entries.iter().position(|set| set.name == name) {
            Some(pos) => pos,
            None => {
                entries.push(TagSet {
                    name: name.to_owned(),
                    config: TagSetConfig {
                        name: name.to_owned(),
                        tag_value: vec![],
                    },
                });
                entries.len() - 1
            }
        };
        &mut entries[pos]
    }
}

// ===== impl PrefixSets =====

impl PrefixSets {
    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ===== impl PrefixSet =====

impl PrefixSet {
    // Adds a prefix to the set, unless already present.
    pub fn add_prefix(
        &mut self,
        prefix: &IpNetwork,
        masklength_range: MaskLengthRange,
    ) {
        let ip_prefix = prefix.to_cidr();
        if self.prefixes.entries.iter().any(|entry| {
            entry.ip_prefix == ip_prefix
                && entry.masklength_range == masklength_range
        }) {
            return;
        }

        self.prefixes.entries.push(Prefix {
            ip_prefix: ip_prefix.clone(),
            masklength_range,
            config: PrefixConfig {
                ip_prefix,
                masklength_range,
            },
        });
    }
}

// ===== impl TagSets =====

impl TagSets {
    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ===== impl TagSet =====

impl TagSet {
    // Replaces the set of tag values.
    pub fn set_tag_values(&mut self, values: &[u32]) {
        self.config.tag_value =
            values.iter().copied().map(TagValue::Numeric).collect();
    }
}

// ===== impl TagValue =====

impl TagValue {
    // Returns the numeric value of the tag, decoding the hexadecimal form if
    // necessary.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            TagValue::Numeric(value) => Some(*value),
            TagValue::Hex(value) => {
                let digits = value
                    .strip_prefix("0x")
                    .or_else(|| value.strip_prefix("0X"))?;
                u32::from_str_radix(digits, 16).ok()
            }
        }
    }
}

// ===== impl PolicyDefinitions =====

impl PolicyDefinitions {
    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ===== impl PolicyDefinition =====

impl PolicyDefinition {
    pub fn new(name: &str) -> PolicyDefinition {
        PolicyDefinition {
            name: name.to_owned(),
            config: PolicyDefinitionConfig {
                name: name.to_owned(),
            },
            statements: Default::default(),
        }
    }

    // Appends a new statement at the end of the policy.
    //
    // Fails if a statement with the same name already exists.
    pub fn append_statement(
        &mut self,
        name: &str,
    ) -> Result<&mut Statement, Error> {
        let entries = &mut self.statements.entries;
        if entries.iter().any(|stmt| stmt.name == name) {
            return Err(Error::DuplicateStatement(
                self.name.clone(),
                name.to_owned(),
            ));
        }

        entries.push(Statement::new(name));
        let pos = entries.len() - 1;
        Ok(&mut entries[pos])
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements.entries
    }
}

// ===== impl Statement =====

impl Statement {
    pub fn new(name: &str) -> Statement {
        Statement {
            name: name.to_owned(),
            config: StatementConfig {
                name: name.to_owned(),
            },
            conditions: Default::default(),
            actions: Default::default(),
        }
    }

    pub fn set_policy_result(&mut self, result: PolicyResult) {
        self.actions.config.policy_result = Some(result);
    }

    pub fn policy_result(&self) -> Option<PolicyResult> {
        self.actions.config.policy_result
    }

    pub fn set_match_prefix_set(&mut self, prefix_set: &str) {
        self.conditions.match_prefix_set = Some(MatchPrefixSet {
            config: MatchPrefixSetConfig {
                prefix_set: prefix_set.to_owned(),
                match_set_options: MatchSetOptionsRestricted::Any,
            },
        });
    }

    pub fn set_match_tag_set(&mut self, tag_set: &str) {
        self.conditions.match_tag_set = Some(MatchTagSet {
            config: MatchTagSetConfig {
                tag_set: tag_set.to_owned(),
                match_set_options: None,
            },
        });
    }
}

// ===== impl Conditions =====

impl Conditions {
    fn is_empty(&self) -> bool {
        self.match_prefix_set.is_none() && self.match_tag_set.is_none()
    }
}

// ===== global functions =====

// Path of the routing policy container.
pub fn path() -> Path {
    Path::root().elem("routing-policy")
}

// Path of a policy definition.
pub fn policy_definition_path(name: &str) -> Path {
    path()
        .elem("policy-definitions")
        .keyed("policy-definition", [("name", name.to_owned())])
}

// Path of a tag-set.
pub fn tag_set_path(name: &str) -> Path {
    path()
        .elem("defined-sets")
        .elem("tag-sets")
        .keyed("tag-set", [("name", name.to_owned())])
}

// Path of the applied tag values of a tag-set.
pub fn tag_set_state_tag_value(name: &str) -> Path {
    tag_set_path(name).elem("state").elem("tag-value")
}

// Path of the applied name of a tag-set.
pub fn tag_set_state_name(name: &str) -> Path {
    tag_set_path(name).elem("state").elem("name")
}

// Builds a routing policy with a single statement.
//
// When a prefix match is given, a prefix-set holding the prefix is added to
// the defined sets and the statement matches on it. When a tag match is
// given, a tag-set holding exactly the given tag value is added to the
// defined sets and the statement matches on it.
pub fn route_policy(
    name: &str,
    statement: &str,
    result: PolicyResult,
    prefix_match: Option<&PrefixMatch>,
    tag_match: Option<&TagMatch>,
) -> Result<RoutingPolicy, Error> {
    let mut rp = RoutingPolicy::default();

    if let Some(prefix_match) = prefix_match {
        let mode = prefix_match.prefix.address_family().into();
        let pset = rp
            .defined_sets
            .prefix_set_mut(&prefix_match.prefix_set, mode);
        pset.add_prefix(&prefix_match.prefix, prefix_match.masklength_range);
    }

    if let Some(tag_match) = tag_match {
        let tag_set = rp.defined_sets.tag_set_mut(&tag_match.tag_set);
        tag_set.set_tag_values(&[tag_match.tag_value]);
    }

    let pdef = rp.policy_definition_mut(name);
    let stmt = pdef.append_statement(statement)?;
    stmt.set_policy_result(result);
    if let Some(prefix_match) = prefix_match {
        stmt.set_match_prefix_set(&prefix_match.prefix_set);
    }
    if let Some(tag_match) = tag_match {
        stmt.set_match_tag_set(&tag_match.tag_set);
    }

    Ok(rp)
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use const_addrs::ip4;
    use serde_json::json;

    use super::*;

    fn v4_prefix_match() -> PrefixMatch {
        PrefixMatch::new(
            "prefix-set-v4".to_owned(),
            IpNetwork::new(ip4!("192.168.10.0").into(), 24).unwrap(),
            MaskLengthRange::Exact,
        )
    }

    #[test]
    fn default_policy() {
        let rp = route_policy(
            "DEFAULT-POLICY-PASS-ALL-V4",
            "PASS-ALL",
            PolicyResult::RejectRoute,
            None,
            None,
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&rp).unwrap(),
            json!({
                "policy-definitions": {
                    "policy-definition": [{
                        "name": "DEFAULT-POLICY-PASS-ALL-V4",
                        "config": { "name": "DEFAULT-POLICY-PASS-ALL-V4" },
                        "statements": {
                            "statement": [{
                                "name": "PASS-ALL",
                                "config": { "name": "PASS-ALL" },
                                "actions": {
                                    "config": { "policy-result": "REJECT_ROUTE" }
                                }
                            }]
                        }
                    }]
                }
            })
        );
    }

    #[test]
    fn prefix_policy() {
        let rp = route_policy(
            "route-policy-v4",
            "statement-v4",
            PolicyResult::AcceptRoute,
            Some(&v4_prefix_match()),
            None,
        )
        .unwrap();

        let pset = rp.defined_sets.prefix_set("prefix-set-v4").unwrap();
        assert_eq!(pset.config.mode, Some(PrefixSetMode::Ipv4));
        assert_eq!(pset.prefixes.entries.len(), 1);
        assert_eq!(pset.prefixes.entries[0].ip_prefix, "192.168.10.0/24");

        let pdef = rp.policy_definition("route-policy-v4").unwrap();
        assert_eq!(pdef.statements().len(), 1);
        let stmt = &pdef.statements()[0];
        assert_eq!(stmt.policy_result(), Some(PolicyResult::AcceptRoute));
        let prefix_match = stmt.conditions.match_prefix_set.as_ref().unwrap();
        assert_eq!(prefix_match.config.prefix_set, "prefix-set-v4");
        assert!(stmt.conditions.match_tag_set.is_none());
        assert!(rp.defined_sets.tag_sets.entries.is_empty());

        let value = serde_json::to_value(&rp).unwrap();
        assert_eq!(
            value["defined-sets"]["prefix-sets"]["prefix-set"][0]["prefixes"]
                ["prefix"][0]["masklength-range"],
            "exact"
        );
    }

    #[test]
    fn tag_policy() {
        let tag_match = TagMatch::new("tag-set-v4".to_owned(), 100);
        let rp = route_policy(
            "route-policy-v4",
            "statement-v4",
            PolicyResult::AcceptRoute,
            None,
            Some(&tag_match),
        )
        .unwrap();

        let tag_set = rp.defined_sets.tag_set("tag-set-v4").unwrap();
        assert_eq!(tag_set.config.name, "tag-set-v4");
        assert_eq!(tag_set.config.tag_value, vec![TagValue::Numeric(100)]);

        let value = serde_json::to_value(&rp).unwrap();
        let stmt = &value["policy-definitions"]["policy-definition"][0]
            ["statements"]["statement"][0];
        assert_eq!(
            stmt["conditions"]["match-tag-set"]["config"]["tag-set"],
            "tag-set-v4"
        );
        assert!(value["defined-sets"].get("prefix-sets").is_none());
    }

    #[test]
    fn round_trip() {
        let rp = route_policy(
            "route-policy-v4",
            "statement-v4",
            PolicyResult::AcceptRoute,
            Some(&v4_prefix_match()),
            None,
        )
        .unwrap();

        let encoded = serde_json::to_string(&rp).unwrap();
        let decoded: RoutingPolicy = serde_json::from_str(&encoded).unwrap();
        assert_eq!(rp, decoded);
    }

    #[test]
    fn duplicate_statement() {
        let mut pdef = PolicyDefinition::new("route-policy-v4");
        pdef.append_statement("statement-v4").unwrap();
        assert_eq!(
            pdef.append_statement("statement-v4").unwrap_err(),
            Error::DuplicateStatement(
                "route-policy-v4".to_owned(),
                "statement-v4".to_owned()
            )
        );
        assert_eq!(pdef.statements().len(), 1);
    }

    #[test]
    fn tag_value_forms() {
        let values: Vec<TagValue> =
            serde_json::from_value(json!([100, "0x64"])).unwrap();
        assert_eq!(values[0].as_u32(), Some(100));
        assert_eq!(values[1].as_u32(), Some(100));
        assert_eq!(TagValue::Hex("64".to_owned()).as_u32(), None);
    }
}
