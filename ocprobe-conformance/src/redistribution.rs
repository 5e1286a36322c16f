//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock as Lazy;
use std::time::Duration;

use ipnetwork::IpNetwork;
use ocprobe_gnmi::{SetBatch, Target, TargetExt};
use ocprobe_openconfig::local_routing::{self, StaticRouteParams};
use ocprobe_openconfig::{routing_policy, table_connection};
use ocprobe_otg::TrafficGenerator;
use ocprobe_otg::flows::{self, FlowParams};
use ocprobe_otg::model::{Config, Flow};
use ocprobe_session::TestSession;
use ocprobe_session::attrs::{ATE_ISIS, ATE_TRAFFIC};
use ocprobe_utils::ip::AddressFamily;
use ocprobe_utils::protocol::InstallProtocol;
use tracing::{error, info};

use crate::runner::{Failure, Runner, Test};
use crate::scenario::{PolicyKind, Scenario, scenarios};
use crate::verify;

// Static routes redistributed into IS-IS.
pub static V4_ROUTE: Lazy<IpNetwork> = Lazy::new(|| {
    IpNetwork::new(Ipv4Addr::new(192, 168, 10, 0).into(), 24).unwrap()
});
pub static V6_ROUTE: Lazy<IpNetwork> = Lazy::new(|| {
    let addr = Ipv6Addr::new(0x2024, 0xdb8, 0x128, 0x128, 0, 0, 0, 0);
    IpNetwork::new(addr.into(), 64).unwrap()
});
pub const V4_ROUTE_TAG: u32 = 40;
pub const V4_ROUTE_METRIC: u32 = 104;
pub const V6_ROUTE_TAG: u32 = 60;
pub const V6_ROUTE_METRIC: u32 = 106;

// Routes advertised by the emulated IS-IS router.
pub static ADVERTISED_V4: Lazy<IpNetwork> = Lazy::new(|| {
    IpNetwork::new(Ipv4Addr::new(192, 168, 1, 4).into(), 30).unwrap()
});
pub static ADVERTISED_V6: Lazy<IpNetwork> = Lazy::new(|| {
    let addr = Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 0);
    IpNetwork::new(addr.into(), 126).unwrap()
});
pub const ADVERTISED_V4_NAME: &str = "v4-isisNet-dev1";
pub const ADVERTISED_V6_NAME: &str = "v6-isisNet-dev1";
pub const ADVERTISED_LINK_METRIC: u32 = 10;

// Traffic destined to the redistributed prefixes.
pub const V4_FLOW: &str = "v4Flow";
pub const V6_FLOW: &str = "v6Flow";
pub const V4_TRAFFIC_START: Ipv4Addr = Ipv4Addr::new(192, 168, 10, 1);
pub const V4_TRAFFIC_COUNT: u32 = 254;
pub const V6_TRAFFIC_START: Ipv6Addr =
    Ipv6Addr::new(0x2024, 0xdb8, 0x128, 0x128, 0, 0, 0, 1);
pub const V6_TRAFFIC_COUNT: u32 = 1;
pub const V4_TRACKING_TAG: &str = "MACTrackingv4";
pub const V6_TRACKING_TAG: &str = "MACTrackingv6";

// Maximum acceptable traffic loss, in percent.
pub const LOSS_TOLERANCE: f64 = 1.0;

const ROUTE_LEARNING_SKIP: &str =
    "Skipping this due to OTG issue not learning routes.";

// Durations of the traffic and convergence phases.
#[derive(Clone, Debug)]
pub struct Settings {
    // How long traffic is sent before checking for loss.
    pub traffic_duration: Duration,
    // How long to wait for flows to report they stopped.
    pub loss_timeout: Duration,
    pub adjacency_timeout: Duration,
    pub arp_timeout: Duration,
}

// ===== impl Settings =====

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            traffic_duration: Duration::from_secs(30),
            loss_timeout: Duration::from_secs(20),
            adjacency_timeout: Duration::from_secs(180),
            arp_timeout: Duration::from_secs(60),
        }
    }
}

// ===== global functions =====

// Runs the initial setup followed by every redistribution scenario.
//
// A failed setup aborts the run. A failed scenario never prevents the next
// ones from running.
pub fn run<T, G>(
    runner: &mut Runner,
    session: &mut TestSession<T, G>,
    settings: &Settings,
) where
    T: Target,
    G: TrafficGenerator,
{
    if !runner.run("Initial Setup", |t| setup(t, session, settings)) {
        error!("initial setup failed, skipping all scenarios");
        return;
    }

    for scenario in scenarios() {
        runner.run(scenario.desc, |t| {
            run_scenario(t, session, settings, &scenario)
        });
    }
}

// Runs the steps of a single scenario.
pub fn run_scenario<T, G>(
    t: &mut Test<'_>,
    session: &mut TestSession<T, G>,
    settings: &Settings,
    scenario: &Scenario,
) -> Result<(), Failure>
where
    T: Target,
    G: TrafficGenerator,
{
    let name = scenario.policy_name;
    let result = scenario.policy_result;
    match scenario.policy_kind {
        PolicyKind::Default => {
            t.run(&format!("Config Default Policy Type {result}"), |_| {
                configure_route_policy(session, scenario)
            });
            let ni = session.deviations.default_network_instance.clone();
            t.run(
                &format!("Attach RPL {name} Type {result} to ISIS {ni}"),
                |_| attach(session, scenario),
            );
            t.run(&format!("Verify RPL {name} Attributes"), |t| {
                verify::verify_table_connection(t, session, scenario)?;
                verify::log_table_connection(t, session)
            });
        }
        PolicyKind::Import => {
            t.run(&format!("Config Import Policy Type {result}"), |t| {
                t.run(&format!("Config {} Route-Policy", scenario.af), |t| {
                    configure_route_policy(session, scenario)?;
                    if let Some(tag_match) = &scenario.tag_match {
                        let desc = format!(
                            "Verify Configuration for RPL {} value {}",
                            tag_match.tag_set, tag_match.tag_value
                        );
                        t.run(&desc, |t| {
                            verify::verify_tag_set(t, session, tag_match)
                        });
                    }
                    Ok(())
                });
                t.run(&format!("Attach RPL {name} To ISIS"), |_| {
                    attach(session, scenario)
                });
                t.run(&format!("Verify RPL {name} Attributes"), |t| {
                    verify::verify_table_connection(t, session, scenario)?;
                    verify::log_table_connection(t, session)
                });
                Ok(())
            });
        }
    }

    if scenario.verify_traffic {
        let desc =
            format!("Verify traffic for [{}]", scenario.flows.join(" "));
        t.run(&desc, |t| {
            verify::verify_traffic(t, session, &scenario.flows, settings)
        });
    }

    t.run("Verify Route on OTG", |_| Err(Failure::skip(ROUTE_LEARNING_SKIP)));

    Ok(())
}

// Pushes the static routes to be redistributed.
pub fn configure_static_routes<T, G>(
    session: &mut TestSession<T, G>,
) -> Result<(), Failure>
where
    T: Target,
    G: TrafficGenerator,
{
    let routes = [
        StaticRouteParams::new(
            *V4_ROUTE,
            V4_ROUTE_TAG,
            ATE_ISIS.ipv4.into(),
            V4_ROUTE_METRIC,
        ),
        StaticRouteParams::new(
            *V6_ROUTE,
            V6_ROUTE_TAG,
            ATE_ISIS.ipv6.into(),
            V6_ROUTE_METRIC,
        ),
    ];
    let protocol = local_routing::static_routes(
        &session.deviations.static_protocol_name,
        &routes,
    )?;
    let path = local_routing::protocol_path(
        &session.deviations.default_network_instance,
        InstallProtocol::STATIC,
        &protocol.name,
    );

    info!(%path, "configuring static routes");
    session.dut.update(path, &protocol)?;
    Ok(())
}

// Builds the traffic flows towards the redistributed prefixes, sent from
// the traffic link and received on the IS-IS link.
pub fn redistribution_flows(
    config: &Config,
) -> Result<Vec<Flow>, ocprobe_otg::Error> {
    let src_mac = ATE_TRAFFIC.mac.unwrap_or_default();
    let params = [
        FlowParams::new(
            V4_FLOW,
            AddressFamily::Ipv4,
            ATE_TRAFFIC.name,
            ATE_ISIS.name,
            src_mac,
            V4_TRAFFIC_START.into(),
            V4_TRAFFIC_COUNT,
            V4_TRACKING_TAG,
        ),
        FlowParams::new(
            V6_FLOW,
            AddressFamily::Ipv6,
            ATE_TRAFFIC.name,
            ATE_ISIS.name,
            src_mac,
            V6_TRAFFIC_START.into(),
            V6_TRAFFIC_COUNT,
            V6_TRACKING_TAG,
        ),
    ];
    params
        .iter()
        .map(|params| flows::device_flow(config, params))
        .collect()
}

// Adds the routes advertised by the emulated IS-IS router.
pub fn advertise_routes<T, G>(
    session: &mut TestSession<T, G>,
) -> Result<(), Failure>
where
    T: Target,
    G: TrafficGenerator,
{
    let router = session
        .ate_isis_router()
        .ok_or_else(|| Failure::fatal("IS-IS is not configured on the ATE"))?;
    flows::advertise_route(
        router,
        ADVERTISED_V4_NAME,
        *ADVERTISED_V4,
        ADVERTISED_LINK_METRIC,
    );
    flows::advertise_route(
        router,
        ADVERTISED_V6_NAME,
        *ADVERTISED_V6,
        ADVERTISED_LINK_METRIC,
    );
    Ok(())
}

// Pushes the route policy of the scenario.
pub fn configure_route_policy<T, G>(
    session: &mut TestSession<T, G>,
    scenario: &Scenario,
) -> Result<(), Failure>
where
    T: Target,
    G: TrafficGenerator,
{
    let rp = routing_policy::route_policy(
        scenario.policy_name,
        scenario.statement,
        scenario.policy_result,
        scenario.prefix_match.as_ref(),
        scenario.tag_match.as_ref(),
    )?;

    info!(policy = %scenario.policy_name, result = %scenario.policy_result,
        "configuring route policy");
    session.dut.update(routing_policy::path(), &rp)?;
    Ok(())
}

// Attaches the route policy of the scenario to the STATIC to IS-IS table
// connections of both address families, in a single Set() request.
pub fn attach<T, G>(
    session: &mut TestSession<T, G>,
    scenario: &Scenario,
) -> Result<(), Failure>
where
    T: Target,
    G: TrafficGenerator,
{
    let deviations = &session.deviations;
    let disable_metric_propagation = (!deviations
        .skip_setting_disable_metric_propagation)
        .then_some(scenario.disable_metric_propagation);
    let conns = table_connection::table_connections(
        &deviations.default_network_instance,
        InstallProtocol::STATIC,
        InstallProtocol::ISIS,
        scenario.af,
        scenario.policy_name,
        disable_metric_propagation,
    );

    let mut batch = SetBatch::new();
    for (path, conn) in &conns {
        batch.update(path.clone(), conn)?;
    }

    info!(policy = %scenario.policy_name, af = %scenario.af,
        "attaching route policy to IS-IS");
    session.dut.set(&batch)?;
    Ok(())
}

// ===== helper functions =====

fn setup<T, G>(
    t: &mut Test<'_>,
    session: &mut TestSession<T, G>,
    settings: &Settings,
) -> Result<(), Failure>
where
    T: Target,
    G: TrafficGenerator,
{
    // Each step depends on the previous one.
    if !t.run("Configure ISIS on DUT", |_| {
        session.push_dut()?;
        Ok(())
    }) {
        return Ok(());
    }
    if !t.run("Configure Static Route on DUT", |_| {
        configure_static_routes(session)
    }) {
        return Ok(());
    }
    t.run("OTG Configuration", |_| configure_ate(session, settings));
    Ok(())
}

fn configure_ate<T, G>(
    session: &mut TestSession<T, G>,
    settings: &Settings,
) -> Result<(), Failure>
where
    T: Target,
    G: TrafficGenerator,
{
    advertise_routes(session)?;
    session.ate_top.flows = redistribution_flows(&session.ate_top)?;
    session.push_and_start()?;
    session.must_adjacency(settings.adjacency_timeout)?;
    session.wait_for_arp(AddressFamily::Ipv4, settings.arp_timeout)?;
    session.wait_for_arp(AddressFamily::Ipv6, settings.arp_timeout)?;
    Ok(())
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use ocprobe_gnmi::testing::MemoryTarget;
    use ocprobe_otg::model::FlowHeader;
    use ocprobe_otg::testing::MemoryGenerator;
    use ocprobe_session::{Deviations, Testbed};

    use super::*;

    fn session() -> TestSession<MemoryTarget, MemoryGenerator> {
        TestSession::new(
            MemoryTarget::new(),
            MemoryGenerator::new(),
            Testbed::default(),
            Deviations::default(),
        )
        .with_isis()
    }

    #[test]
    fn flows() {
        let session = session();
        let flows = redistribution_flows(&session.ate_top).unwrap();
        assert_eq!(flows.len(), 2);

        let v4 = &flows[0];
        assert_eq!(v4.name, "v4Flow");
        assert_eq!(v4.tx_rx.device.tx_names, ["ate2.IPv4"]);
        assert_eq!(v4.tx_rx.device.rx_names, ["ate1.IPv4"]);
        let FlowHeader::Ipv4 { ipv4 } = &v4.packet[1] else {
            panic!("unexpected header {:?}", v4.packet[1]);
        };
        let dst = ipv4.dst.as_ref().unwrap().increment.as_ref().unwrap();
        assert_eq!(dst.start, "192.168.10.1");
        assert_eq!(dst.count, 254);

        let v6 = &flows[1];
        assert_eq!(v6.tx_rx.device.rx_names, ["ate1.IPv6"]);
    }

    #[test]
    fn advertised_routes() {
        let mut session = session();
        advertise_routes(&mut session).unwrap();
        let router = session.ate_isis_router().unwrap();
        assert_eq!(router.v4_routes[0].name, "v4-isisNet-dev1");
        assert_eq!(router.v4_routes[0].addresses[0].address, "192.168.1.4");
        assert_eq!(router.v6_routes[0].addresses[0].prefix, 126);
    }

    #[test]
    fn advertised_routes_without_isis() {
        let mut session = TestSession::new(
            MemoryTarget::new(),
            MemoryGenerator::new(),
            Testbed::default(),
            Deviations::default(),
        );
        assert!(matches!(
            advertise_routes(&mut session),
            Err(Failure::Fatal(_))
        ));
    }
}
