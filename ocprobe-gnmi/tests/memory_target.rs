//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use const_addrs::{ip4, ip6};
use ipnetwork::IpNetwork;
use ocprobe_gnmi::testing::MemoryTarget;
use ocprobe_gnmi::{DataType, SetBatch, Target, TargetExt};
use ocprobe_openconfig::local_routing::{
    self, StaticProtocol, StaticRouteParams,
};
use ocprobe_openconfig::routing_policy::{
    self, PrefixMatch, RoutingPolicy, TagValue,
};
use ocprobe_openconfig::table_connection::{self, TableConnectionConfig};
use ocprobe_utils::ip::AddressFamily;
use ocprobe_utils::policy::{MaskLengthRange, PolicyResult};
use ocprobe_utils::protocol::InstallProtocol;
use serde_json::json;

fn static_routes() -> StaticProtocol {
    local_routing::static_routes("DEFAULT", &[
        StaticRouteParams::new(
            IpNetwork::new(ip4!("192.168.10.0").into(), 24).unwrap(),
            40,
            ip4!("192.0.2.2").into(),
            104,
        ),
        StaticRouteParams::new(
            IpNetwork::new(ip6!("2024:db8:128:128::").into(), 64).unwrap(),
            60,
            ip6!("2001:db8::192:0:2:2").into(),
            106,
        ),
    ])
    .unwrap()
}

#[test]
fn static_routes_idempotent() {
    let path = local_routing::protocol_path(
        "DEFAULT",
        InstallProtocol::STATIC,
        "DEFAULT",
    );
    let routes = static_routes();

    let mut target = MemoryTarget::new();
    target.update(path.clone(), &routes).unwrap();
    let once = target.config.clone();
    target.update(path.clone(), &routes).unwrap();
    assert_eq!(target.config, once);
    assert_eq!(target.set_requests.len(), 2);

    let read: StaticProtocol = target.get_config(&path).unwrap();
    assert_eq!(read, routes);
}

#[test]
fn policy_round_trip() {
    let prefix_match = PrefixMatch::new(
        "prefix-set-v4".to_owned(),
        IpNetwork::new(ip4!("192.168.10.0").into(), 24).unwrap(),
        MaskLengthRange::Exact,
    );
    let rp = routing_policy::route_policy(
        "route-policy-v4",
        "statement-v4",
        PolicyResult::AcceptRoute,
        Some(&prefix_match),
        None,
    )
    .unwrap();

    let mut target = MemoryTarget::new();
    target.update(routing_policy::path(), &rp).unwrap();

    let read: RoutingPolicy =
        target.get_config(&routing_policy::path()).unwrap();
    let pdef = read.policy_definition("route-policy-v4").unwrap();
    assert_eq!(pdef.statements().len(), 1);
    assert_eq!(
        pdef.statements()[0].policy_result(),
        Some(PolicyResult::AcceptRoute)
    );
    let pset = read.defined_sets.prefix_set("prefix-set-v4").unwrap();
    assert_eq!(pset.prefixes.entries[0].ip_prefix, "192.168.10.0/24");
}

#[test]
fn table_connection_batch() {
    let mut batch = SetBatch::new();
    for (path, conn) in table_connection::table_connections(
        "DEFAULT",
        InstallProtocol::STATIC,
        InstallProtocol::ISIS,
        AddressFamily::Ipv4,
        "DEFAULT-POLICY-PASS-ALL-V4",
        Some(false),
    ) {
        batch.update(path, &conn).unwrap();
    }

    let mut target = MemoryTarget::new();
    target.set(&batch).unwrap();
    assert_eq!(target.set_requests.len(), 1);

    for af in [AddressFamily::Ipv4, AddressFamily::Ipv6] {
        let path = table_connection::config_path(
            "DEFAULT",
            InstallProtocol::STATIC,
            InstallProtocol::ISIS,
            af,
        );
        let config: TableConnectionConfig = target.get_config(&path).unwrap();
        assert_eq!(config.src_protocol, InstallProtocol::STATIC);
        assert_eq!(config.dst_protocol, InstallProtocol::ISIS);
        assert_eq!(config.address_family, af);
        assert_eq!(config.import_policy, vec!["DEFAULT-POLICY-PASS-ALL-V4"]);
        assert!(!config.metric_propagation_disabled());
    }
}

#[test]
fn state_mirrors_config() {
    let mut target = MemoryTarget::new();
    let rp = routing_policy::route_policy(
        "route-policy-v4",
        "statement-v4",
        PolicyResult::AcceptRoute,
        None,
        Some(&routing_policy::TagMatch::new("tag-set-v4".to_owned(), 100)),
    )
    .unwrap();
    target.update(routing_policy::path(), &rp).unwrap();

    let values: Vec<TagValue> = target
        .get_state(&routing_policy::tag_set_state_tag_value("tag-set-v4"))
        .unwrap();
    assert_eq!(values, vec![TagValue::Numeric(100)]);
    let name: String = target
        .get_state(&routing_policy::tag_set_state_name("tag-set-v4"))
        .unwrap();
    assert_eq!(name, "tag-set-v4");

    // Configuration reads don't see the state containers.
    let result = target.lookup_config::<String>(
        &routing_policy::tag_set_state_name("tag-set-v4"),
    );
    assert_eq!(result.unwrap(), None);
    assert_eq!(target.get_requests.last().unwrap().1, DataType::Config);
}

#[test]
fn operational_state() {
    let mut target = MemoryTarget::new();
    let path = "/a/b[name=x]/state".parse().unwrap();
    target.set_state(&path, json!({"oper-status": "UP"}));
    let value: serde_json::Value = target.get_state(&path).unwrap();
    assert_eq!(value, json!({"oper-status": "UP"}));
}

#[test]
fn set_failure() {
    let mut target = MemoryTarget::new();
    target.set_error = Some(tonic::Status::invalid_argument("bad value"));
    let result = target.update(routing_policy::path(), &json!({}));
    assert!(result.is_err());
    assert_eq!(target.config, serde_json::Value::Null);
    assert!(target.update(routing_policy::path(), &json!({})).is_ok());
}
