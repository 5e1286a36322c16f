//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use std::time::Duration;

use ocprobe_conformance::redistribution::{
    self, V4_FLOW, V4_ROUTE, V6_FLOW, V6_ROUTE,
};
use ocprobe_conformance::scenario::{Scenario, scenarios};
use ocprobe_conformance::{Outcome, Runner, Settings};
use ocprobe_gnmi::TargetExt;
use ocprobe_gnmi::testing::MemoryTarget;
use ocprobe_openconfig::isis;
use ocprobe_openconfig::local_routing::{self, StaticProtocol};
use ocprobe_openconfig::routing_policy::{self, RoutingPolicy};
use ocprobe_openconfig::table_connection::{self, TableConnectionConfig};
use ocprobe_otg::model::{ControlState, State};
use ocprobe_otg::testing::MemoryGenerator;
use ocprobe_session::session::ISIS_LEVEL;
use ocprobe_session::{Deviations, TestSession, Testbed};
use ocprobe_utils::ip::AddressFamily;
use ocprobe_utils::policy::PolicyResult;
use ocprobe_utils::protocol::InstallProtocol;
use serde_json::json;

fn settings() -> Settings {
    Settings {
        traffic_duration: Duration::ZERO,
        loss_timeout: Duration::ZERO,
        adjacency_timeout: Duration::ZERO,
        arp_timeout: Duration::ZERO,
    }
}

fn session(
    deviations: Deviations,
) -> TestSession<MemoryTarget, MemoryGenerator> {
    let mut session = TestSession::new(
        MemoryTarget::new(),
        MemoryGenerator::new(),
        Testbed::default(),
        deviations,
    )
    .with_isis();

    // IS-IS adjacency with the emulated router.
    let path =
        isis::adjacencies_path("DEFAULT", "DEFAULT", "port1", ISIS_LEVEL);
    session.dut.set_state(
        &path,
        json!({
            "adjacency": [{
                "system-id": "6400.0000.0001",
                "state": {
                    "system-id": "6400.0000.0001",
                    "adjacency-state": "UP"
                }
            }]
        }),
    );

    // No loss on either flow.
    session.ate.set_flow_counters(V4_FLOW, 1000, 1000);
    session.ate.set_flow_counters(V6_FLOW, 1000, 1000);

    session
}

fn scenario(id: &str) -> Scenario {
    scenarios()
        .into_iter()
        .find(|scenario| scenario.id() == id)
        .unwrap()
}

fn table_connection(
    session: &mut TestSession<MemoryTarget, MemoryGenerator>,
    af: AddressFamily,
) -> TableConnectionConfig {
    let path = table_connection::config_path(
        "DEFAULT",
        InstallProtocol::STATIC,
        InstallProtocol::ISIS,
        af,
    );
    session.dut.get_config(&path).unwrap()
}

#[test]
fn full_run() {
    let mut session = session(Deviations::default());
    let mut runner = Runner::new();
    redistribution::run(&mut runner, &mut session, &settings());
    let report = runner.finish();

    assert!(!report.failed(), "{report}");
    assert_eq!(
        report.get(&["Initial Setup", "OTG Configuration"]).unwrap().outcome,
        Outcome::Passed
    );
    // The route learning check is skipped by every scenario.
    assert_eq!(report.count(Outcome::Skipped), 9);

    // The ATE received both flows and sent traffic four times.
    let config = session.ate.config.as_ref().unwrap();
    assert!(config.flow(V4_FLOW).is_some());
    assert!(config.flow(V6_FLOW).is_some());
    let traffic_starts = session
        .ate
        .control_states
        .iter()
        .filter(|state| **state == ControlState::traffic(State::Start))
        .count();
    assert_eq!(traffic_starts, 4);
}

#[test]
fn setup_failure_aborts() {
    let mut session = session(Deviations::default());
    session.dut.set_error = Some(tonic::Status::unavailable("down"));
    let mut runner = Runner::new();
    redistribution::run(&mut runner, &mut session, &settings());
    let report = runner.finish();

    assert!(report.failed());
    let setup = report.find("Initial Setup").unwrap();
    assert_eq!(setup.outcome, Outcome::Failed);
    // Neither the remaining setup steps nor any scenario ran.
    assert!(report.find("Configure Static Route on DUT").is_none());
    assert_eq!(report.results.len(), 2);
}

#[test]
fn default_policy_reject() {
    let mut session = session(Deviations::default());
    let scenario = scenario("RT-2.12.5");
    let mut runner = Runner::new();
    runner.run(scenario.desc, |t| {
        redistribution::run_scenario(t, &mut session, &settings(), &scenario)
    });
    let report = runner.finish();
    assert!(!report.failed(), "{report}");

    // A single Set() per policy push and per table connection pair.
    assert_eq!(session.dut.set_requests.len(), 2);
    assert_eq!(session.dut.set_requests[1].len(), 2);

    let config = table_connection(&mut session, AddressFamily::Ipv4);
    assert_eq!(config.import_policy, ["DEFAULT-POLICY-PASS-ALL-V4"]);
    assert!(!config.metric_propagation_disabled());
    let config = table_connection(&mut session, AddressFamily::Ipv6);
    assert_eq!(config.import_policy, ["DEFAULT-POLICY-PASS-ALL-V4"]);

    let rp: RoutingPolicy =
        session.dut.get_config(&routing_policy::path()).unwrap();
    let pdef = rp.policy_definition("DEFAULT-POLICY-PASS-ALL-V4").unwrap();
    assert_eq!(
        pdef.statements()[0].policy_result(),
        Some(PolicyResult::RejectRoute)
    );

    // No traffic is sent.
    assert!(session.ate.control_states.is_empty());
}

#[test]
fn prefix_policy_with_traffic() {
    let mut session = session(Deviations::default());
    redistribution::configure_static_routes(&mut session).unwrap();
    let scenario = scenario("RT-2.12.6");
    let mut runner = Runner::new();
    runner.run(scenario.desc, |t| {
        redistribution::run_scenario(t, &mut session, &settings(), &scenario)
    });
    let report = runner.finish();
    assert!(!report.failed(), "{report}");

    let path = [
        scenario.desc,
        "Config Import Policy Type ACCEPT_ROUTE",
        "Attach RPL route-policy-v4 To ISIS",
    ];
    assert_eq!(report.get(&path).unwrap().outcome, Outcome::Passed);
    let traffic = report.find("Verify traffic for [v4Flow]").unwrap();
    assert_eq!(traffic.messages, ["Traffic loss for flow v4Flow is 0%"]);

    let rp: RoutingPolicy =
        session.dut.get_config(&routing_policy::path()).unwrap();
    let pdef = rp.policy_definition("route-policy-v4").unwrap();
    assert_eq!(pdef.statements().len(), 1);
    let statement = &pdef.statements()[0];
    assert_eq!(statement.policy_result(), Some(PolicyResult::AcceptRoute));
    let match_prefix_set =
        statement.conditions.match_prefix_set.as_ref().unwrap();
    assert_eq!(match_prefix_set.config.prefix_set, "prefix-set-v4");
    let prefix_set = rp.defined_sets.prefix_set("prefix-set-v4").unwrap();
    assert_eq!(prefix_set.prefixes.entries[0].ip_prefix, "192.168.10.0/24");

    let config = table_connection(&mut session, AddressFamily::Ipv4);
    assert_eq!(config.import_policy, ["route-policy-v4"]);
    assert!(config.metric_propagation_disabled());
}

#[test]
fn traffic_loss() {
    let mut session = session(Deviations::default());
    session.ate.set_flow_counters(V4_FLOW, 1000, 900);
    let scenario = scenario("RT-2.12.6");
    let mut runner = Runner::new();
    runner.run(scenario.desc, |t| {
        redistribution::run_scenario(t, &mut session, &settings(), &scenario)
    });
    let report = runner.finish();

    let traffic = report.find("Verify traffic for [v4Flow]").unwrap();
    assert_eq!(traffic.outcome, Outcome::Failed);
    assert_eq!(
        traffic.messages,
        ["Traffic loss too high for flow v4Flow: 10%"]
    );
    // The route learning check still runs.
    let skipped = report.find("Verify Route on OTG").unwrap();
    assert_eq!(skipped.outcome, Outcome::Skipped);
}

#[test]
fn tag_set() {
    let mut session = session(Deviations::default());
    let scenario = scenario("RT-2.12.7");
    let mut runner = Runner::new();
    runner.run(scenario.desc, |t| {
        redistribution::run_scenario(t, &mut session, &settings(), &scenario)
    });
    let report = runner.finish();
    assert!(!report.failed(), "{report}");
    let verify = report
        .find("Verify Configuration for RPL tag-set-v4 value 100")
        .unwrap();
    assert_eq!(verify.outcome, Outcome::Passed);
}

#[test]
fn tag_set_mismatch() {
    let mut session = session(Deviations::default());
    let path = routing_policy::tag_set_state_tag_value("tag-set-v4");
    session.dut.set_state(&path, json!([100, 200]));
    let scenario = scenario("RT-2.12.7");
    let mut runner = Runner::new();
    runner.run(scenario.desc, |t| {
        redistribution::run_scenario(t, &mut session, &settings(), &scenario)
    });
    let report = runner.finish();

    let verify = report
        .find("Verify Configuration for RPL tag-set-v4 value 100")
        .unwrap();
    assert_eq!(verify.outcome, Outcome::Failed);
    assert_eq!(
        verify.messages,
        ["tag-set tag-set-v4 holds [Some(100), Some(200)], expected 100"]
    );
    // Tag mismatches don't stop the attachment.
    let attach = report.find("Attach RPL route-policy-v4 To ISIS").unwrap();
    assert_eq!(attach.outcome, Outcome::Passed);
}

#[test]
fn import_policy_mismatch() {
    let mut session = session(Deviations::default());
    let scenario = scenario("RT-2.12.8");
    let path = table_connection::config_path(
        "DEFAULT",
        InstallProtocol::STATIC,
        InstallProtocol::ISIS,
        AddressFamily::Ipv6,
    );
    let mut runner = Runner::new();
    runner.run("mismatch", |t| {
        redistribution::configure_route_policy(&mut session, &scenario)?;
        redistribution::attach(&mut session, &scenario)?;
        session
            .dut
            .update(path.elem("import-policy"), &["other-policy"])?;
        t.run("verify", |t| {
            ocprobe_conformance::verify::verify_table_connection(
                t,
                &mut session,
                &scenario,
            )
        });
        Ok(())
    });
    let report = runner.finish();

    let verify = report.find("verify").unwrap();
    assert_eq!(verify.outcome, Outcome::Failed);
    assert_eq!(
        verify.messages,
        ["import-policy is not set to route-policy-v6 as expected"]
    );
}

#[test]
fn skip_metric_propagation() {
    let deviations = Deviations {
        skip_setting_disable_metric_propagation: true,
        ..Default::default()
    };
    let mut session = session(deviations);
    let scenario = scenario("RT-2.12.3");
    let mut runner = Runner::new();
    runner.run(scenario.desc, |t| {
        redistribution::run_scenario(t, &mut session, &settings(), &scenario)
    });
    let report = runner.finish();
    assert!(!report.failed(), "{report}");

    let config = table_connection(&mut session, AddressFamily::Ipv4);
    assert_eq!(config.disable_metric_propagation, None);
}

#[test]
fn static_routes_idempotent() {
    let mut session = session(Deviations::default());
    redistribution::configure_static_routes(&mut session).unwrap();
    let once = session.dut.config.clone();
    redistribution::configure_static_routes(&mut session).unwrap();
    assert_eq!(session.dut.config, once);

    let path = local_routing::protocol_path(
        "DEFAULT",
        InstallProtocol::STATIC,
        "DEFAULT",
    );
    let protocol: StaticProtocol = session.dut.get_config(&path).unwrap();
    assert_eq!(protocol.static_routes.entries.len(), 2);
    let route = protocol.route(&V4_ROUTE).unwrap();
    let next_hop = &route.next_hops.entries[0].config;
    assert_eq!(next_hop.next_hop, "192.0.2.2");
    assert_eq!(next_hop.metric, Some(104));
    let route = protocol.route(&V6_ROUTE).unwrap();
    let next_hop = &route.next_hops.entries[0].config;
    assert_eq!(next_hop.next_hop, "2001:db8::192:0:2:2");
}

#[test]
fn scenario_failure_isolated() {
    let mut session = session(Deviations::default());
    session.ate.set_flow_counters(V4_FLOW, 1000, 0);
    let mut runner = Runner::new();
    redistribution::run(&mut runner, &mut session, &settings());
    let report = runner.finish();

    assert!(report.failed());
    // Every scenario sending IPv4 traffic fails on its own.
    for id in ["RT-2.12.6", "RT-2.12.7", "RT-2.12.9"] {
        let result = report.get(&[scenario(id).desc]).unwrap();
        assert_eq!(result.outcome, Outcome::Failed, "{id}");
    }
    // Later scenarios still run to completion.
    let result = report.get(&[scenario("RT-2.12.8").desc]).unwrap();
    assert_eq!(result.outcome, Outcome::Passed);
    assert_eq!(report.count(Outcome::Skipped), 9);
}

#[test]
fn adjacency_checked_before_arp() {
    let mut session = TestSession::new(
        MemoryTarget::new(),
        MemoryGenerator::new(),
        Testbed::default(),
        Deviations::default(),
    )
    .with_isis();
    session.ate.resolve_neighbors = false;
    let mut runner = Runner::new();
    redistribution::run(&mut runner, &mut session, &settings());
    let report = runner.finish();

    // Neither the adjacency nor ARP converge: the adjacency is reported.
    let otg = report.find("OTG Configuration").unwrap();
    assert_eq!(otg.outcome, Outcome::Failed);
    assert_eq!(otg.messages.len(), 1);
    assert!(
        otg.messages[0].starts_with("IS-IS adjacency on"),
        "{}",
        otg.messages[0]
    );
}
