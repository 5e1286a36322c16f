//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use ocprobe_gnmi::{Target, TargetExt};
use ocprobe_openconfig::routing_policy::{self, TagMatch, TagValue};
use ocprobe_openconfig::table_connection::{self, TableConnectionConfig};
use ocprobe_otg::{TrafficGenerator, TrafficGeneratorExt, monitor};
use ocprobe_session::TestSession;
use ocprobe_utils::ip::AddressFamily;
use ocprobe_utils::protocol::InstallProtocol;
use tracing::info;

use crate::redistribution::{LOSS_TOLERANCE, Settings};
use crate::runner::{Failure, Test, ensure};
use crate::scenario::Scenario;

// ===== global functions =====

// Reads back the intended configuration of the STATIC to IS-IS table
// connection of the scenario and checks every attribute that was pushed.
pub fn verify_table_connection<T, G>(
    t: &mut Test<'_>,
    session: &mut TestSession<T, G>,
    scenario: &Scenario,
) -> Result<(), Failure>
where
    T: Target,
    G: TrafficGenerator,
{
    let path = table_connection::config_path(
        &session.deviations.default_network_instance,
        InstallProtocol::STATIC,
        InstallProtocol::ISIS,
        scenario.af,
    );
    let config: TableConnectionConfig = session.dut.get_config(&path)?;

    ensure(
        config.src_protocol == InstallProtocol::STATIC,
        "src-protocol is not set to STATIC as expected",
    )?;
    ensure(
        config.dst_protocol == InstallProtocol::ISIS,
        "dst-protocol is not set to ISIS as expected",
    )?;
    ensure(
        config.address_family == scenario.af,
        format!("address-family is not set to {} as expected", scenario.af),
    )?;
    // The leaf is never written when the device doesn't support it.
    if !session.deviations.skip_setting_disable_metric_propagation {
        ensure(
            config.metric_propagation_disabled()
                == scenario.disable_metric_propagation,
            format!(
                "disable-metric-propagation is not set to {} as expected",
                scenario.disable_metric_propagation
            ),
        )?;
    }
    let import_policy_msg = format!(
        "import-policy is not set to {} as expected",
        scenario.policy_name
    );
    ensure(!config.import_policy.is_empty(), &import_policy_msg)?;
    for policy in &config.import_policy {
        ensure(policy == scenario.policy_name, &import_policy_msg)?;
    }

    t.log(format!("{path} matches the pushed configuration"));
    Ok(())
}

// Logs the applied state of the IPv4 table connection, if the device
// reports any.
pub fn log_table_connection<T, G>(
    t: &mut Test<'_>,
    session: &mut TestSession<T, G>,
) -> Result<(), Failure>
where
    T: Target,
    G: TrafficGenerator,
{
    let path = table_connection::state_path(
        &session.deviations.default_network_instance,
        InstallProtocol::STATIC,
        InstallProtocol::ISIS,
        AddressFamily::Ipv4,
    );
    let state: Option<TableConnectionConfig> =
        session.dut.lookup_state(&path)?;
    match state {
        Some(state) => t.log(format!("table connection state: {state:?}")),
        None => t.log(format!("no state at {path}")),
    }
    Ok(())
}

// Checks that the applied tag-set holds exactly the configured value under
// the configured name. Every mismatch is a non-fatal error.
pub fn verify_tag_set<T, G>(
    t: &mut Test<'_>,
    session: &mut TestSession<T, G>,
    tag_match: &TagMatch,
) -> Result<(), Failure>
where
    T: Target,
    G: TrafficGenerator,
{
    let name = &tag_match.tag_set;

    let path = routing_policy::tag_set_state_tag_value(name);
    match session.dut.lookup_state::<Vec<TagValue>>(&path) {
        Ok(values) => {
            let values = values
                .unwrap_or_default()
                .iter()
                .map(|value| value.as_u32())
                .collect::<Vec<_>>();
            t.check(
                values == [Some(tag_match.tag_value)],
                format!(
                    "tag-set {name} holds {values:?}, expected {}",
                    tag_match.tag_value
                ),
            );
        }
        Err(error) => {
            error.log();
            t.error(format!("failed to read tag values of {name}: {error}"));
        }
    }

    let path = routing_policy::tag_set_state_name(name);
    match session.dut.lookup_state::<String>(&path) {
        Ok(got) => {
            let got = got.unwrap_or_default();
            t.check(
                got == *name,
                format!("failed to get tag-set name: got {got}, wanted {name}"),
            );
        }
        Err(error) => {
            error.log();
            t.error(format!("failed to read name of tag-set {name}: {error}"));
        }
    }

    Ok(())
}

// Sends traffic on the given flows for the configured duration, then checks
// that the loss of every flow stays within the tolerance.
pub fn verify_traffic<T, G>(
    t: &mut Test<'_>,
    session: &mut TestSession<T, G>,
    flows: &[&str],
    settings: &Settings,
) -> Result<(), Failure>
where
    T: Target,
    G: TrafficGenerator,
{
    info!(?flows, duration = ?settings.traffic_duration, "starting traffic");
    session.ate.start_traffic()?;
    std::thread::sleep(settings.traffic_duration);
    session.ate.stop_traffic()?;
    info!("traffic stopped");

    for flow in flows {
        let timeout = settings.loss_timeout;
        let loss = monitor::flow_loss_pct(&mut session.ate, flow, timeout)?;
        if loss > LOSS_TOLERANCE {
            t.error(format!("Traffic loss too high for flow {flow}: {loss}%"));
        } else {
            t.log(format!("Traffic loss for flow {flow} is {loss}%"));
        }
    }

    Ok(())
}
