//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use ocprobe_openconfig::routing_policy::{PrefixMatch, TagMatch};
use ocprobe_utils::ip::AddressFamily;
use ocprobe_utils::policy::{MaskLengthRange, PolicyResult};

use crate::redistribution::{V4_FLOW, V4_ROUTE, V6_FLOW, V6_ROUTE};

// Policy names.
pub const DEFAULT_POLICY_V4: &str = "DEFAULT-POLICY-PASS-ALL-V4";
pub const DEFAULT_POLICY_V6: &str = "DEFAULT-POLICY-PASS-ALL-V6";
pub const DEFAULT_STATEMENT: &str = "PASS-ALL";
pub const V4_ROUTE_POLICY: &str = "route-policy-v4";
pub const V4_STATEMENT: &str = "statement-v4";
pub const V4_PREFIX_SET: &str = "prefix-set-v4";
pub const V6_ROUTE_POLICY: &str = "route-policy-v6";
pub const V6_STATEMENT: &str = "statement-v6";
pub const V6_PREFIX_SET: &str = "prefix-set-v6";

// How the policy of a scenario is configured and verified.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PolicyKind {
    // Catch-all policy without conditions.
    Default,
    // Import policy matching on a prefix-set or a tag-set.
    Import,
}

// One row of the redistribution test table.
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    pub desc: &'static str,
    // Address family of the table connection under test.
    pub af: AddressFamily,
    pub policy_kind: PolicyKind,
    pub policy_result: PolicyResult,
    pub policy_name: &'static str,
    pub statement: &'static str,
    pub prefix_match: Option<PrefixMatch>,
    pub tag_match: Option<TagMatch>,
    // Value written to the disable-metric-propagation leaf.
    pub disable_metric_propagation: bool,
    pub verify_traffic: bool,
    pub flows: Vec<&'static str>,
}

// ===== impl Scenario =====

impl Scenario {
    // Test identifier (e.g. "RT-2.12.6").
    pub fn id(&self) -> &'static str {
        self.desc.split(':').next().unwrap_or(self.desc)
    }

    fn default_policy(
        desc: &'static str,
        af: AddressFamily,
        policy_result: PolicyResult,
        disable_metric_propagation: bool,
    ) -> Scenario {
        let policy_name = match af {
            AddressFamily::Ipv4 => DEFAULT_POLICY_V4,
            AddressFamily::Ipv6 => DEFAULT_POLICY_V6,
        };
        Scenario {
            desc,
            af,
            policy_kind: PolicyKind::Default,
            policy_result,
            policy_name,
            statement: DEFAULT_STATEMENT,
            prefix_match: None,
            tag_match: None,
            disable_metric_propagation,
            verify_traffic: false,
            flows: vec![],
        }
    }
}

// ===== global functions =====

// Returns the scenarios RT-2.12.1 through RT-2.12.9, in execution order.
pub fn scenarios() -> Vec<Scenario> {
    let v4_prefix_match = PrefixMatch::new(
        V4_PREFIX_SET.to_owned(),
        *V4_ROUTE,
        MaskLengthRange::Exact,
    );
    let v6_prefix_match = PrefixMatch::new(
        V6_PREFIX_SET.to_owned(),
        *V6_ROUTE,
        MaskLengthRange::Exact,
    );

    vec![
        Scenario::default_policy(
            "RT-2.12.1: Redistribute IPv4 static route to IS-IS with metric propagation disabled",
            AddressFamily::Ipv4,
            PolicyResult::AcceptRoute,
            false,
        ),
        Scenario::default_policy(
            "RT-2.12.2: Redistribute IPv4 static route to IS-IS with metric propagation enabled",
            AddressFamily::Ipv6,
            PolicyResult::AcceptRoute,
            false,
        ),
        Scenario::default_policy(
            "RT-2.12.3: Redistribute IPv6 static route to IS-IS with metric propagation disabled",
            AddressFamily::Ipv4,
            PolicyResult::AcceptRoute,
            true,
        ),
        Scenario::default_policy(
            "RT-2.12.4: Redistribute IPv6 static route to IS-IS with metric propagation enabled",
            AddressFamily::Ipv6,
            PolicyResult::AcceptRoute,
            true,
        ),
        Scenario::default_policy(
            "RT-2.12.5: Redistribute IPv4 and IPv6 static route to IS-IS with default-import-policy set to reject",
            AddressFamily::Ipv4,
            PolicyResult::RejectRoute,
            false,
        ),
        Scenario {
            desc: "RT-2.12.6: Redistribute IPv4 static route to IS-IS matching a prefix using a route-policy",
            af: AddressFamily::Ipv4,
            policy_kind: PolicyKind::Import,
            policy_result: PolicyResult::AcceptRoute,
            policy_name: V4_ROUTE_POLICY,
            statement: V4_STATEMENT,
            prefix_match: Some(v4_prefix_match),
            tag_match: None,
            disable_metric_propagation: true,
            verify_traffic: true,
            flows: vec![V4_FLOW],
        },
        Scenario {
            desc: "RT-2.12.7: Redistribute IPv4 static route to IS-IS matching a tag",
            af: AddressFamily::Ipv4,
            policy_kind: PolicyKind::Import,
            policy_result: PolicyResult::AcceptRoute,
            policy_name: V4_ROUTE_POLICY,
            statement: V4_STATEMENT,
            prefix_match: None,
            tag_match: Some(TagMatch::new("tag-set-v4".to_owned(), 100)),
            disable_metric_propagation: true,
            verify_traffic: true,
            flows: vec![V4_FLOW],
        },
        Scenario {
            desc: "RT-2.12.8: Redistribute IPv6 static route to IS-IS matching a prefix using a route-policy",
            af: AddressFamily::Ipv6,
            policy_kind: PolicyKind::Import,
            policy_result: PolicyResult::AcceptRoute,
            policy_name: V6_ROUTE_POLICY,
            statement: V6_STATEMENT,
            prefix_match: Some(v6_prefix_match),
            tag_match: None,
            disable_metric_propagation: false,
            verify_traffic: true,
            flows: vec![V6_FLOW],
        },
        Scenario {
            desc: "RT-2.12.9: Redistribute IPv6 static route to IS-IS matching a prefix using a route-policy",
            af: AddressFamily::Ipv4,
            policy_kind: PolicyKind::Import,
            policy_result: PolicyResult::AcceptRoute,
            policy_name: V6_ROUTE_POLICY,
            statement: V6_STATEMENT,
            prefix_match: None,
            tag_match: Some(TagMatch::new("tag-set-v6".to_owned(), 100)),
            disable_metric_propagation: true,
            verify_traffic: true,
            flows: vec![V4_FLOW],
        },
    ]
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table() {
        let scenarios = scenarios();
        assert_eq!(scenarios.len(), 9);
        let ids = scenarios.iter().map(Scenario::id).collect::<Vec<_>>();
        assert_eq!(ids[0], "RT-2.12.1");
        assert_eq!(ids[8], "RT-2.12.9");

        // Default catch-all policies never verify traffic.
        for scenario in &scenarios[..5] {
            assert_eq!(scenario.policy_kind, PolicyKind::Default);
            assert!(!scenario.verify_traffic);
            assert!(scenario.prefix_match.is_none());
        }

        let rt5 = &scenarios[4];
        assert_eq!(rt5.policy_result, PolicyResult::RejectRoute);
        assert_eq!(rt5.policy_name, "DEFAULT-POLICY-PASS-ALL-V4");

        let rt6 = &scenarios[5];
        let prefix_match = rt6.prefix_match.as_ref().unwrap();
        assert_eq!(prefix_match.prefix.to_string(), "192.168.10.0/24");
        assert_eq!(prefix_match.masklength_range, MaskLengthRange::Exact);
        assert_eq!(rt6.flows, ["v4Flow"]);

        let rt9 = &scenarios[8];
        assert_eq!(rt9.af, AddressFamily::Ipv4);
        assert_eq!(rt9.policy_name, "route-policy-v6");
        assert_eq!(rt9.tag_match.as_ref().unwrap().tag_set, "tag-set-v6");
    }
}
