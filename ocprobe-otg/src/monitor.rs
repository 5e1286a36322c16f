//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use std::time::{Duration, Instant};

use ocprobe_utils::ip::AddressFamily;
use tracing::{debug, info, warn};

use crate::client::{TrafficGenerator, TrafficGeneratorExt};
use crate::error::Error;
use crate::model::{Config, FlowMetric, TransmitState};

// Interval between two consecutive state polls.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

// ===== global functions =====

// Waits for a flow to stop transmitting and returns its loss percentage.
//
// If the flow is still transmitting once the timeout expires, the loss is
// computed from the last counters read.
pub fn flow_loss_pct<G>(
    generator: &mut G,
    flow: &str,
    timeout: Duration,
) -> Result<f64, Error>
where
    G: TrafficGenerator + ?Sized,
{
    let deadline = Instant::now() + timeout;
    let metric = loop {
        let metric = generator
            .flow_metrics(&[flow])?
            .into_iter()
            .find(|metric| metric.name == flow)
            .ok_or_else(|| Error::UnknownFlow(flow.to_owned()))?;
        if metric.transmit == Some(TransmitState::Stopped) {
            break metric;
        }
        if Instant::now() >= deadline {
            warn!(%flow, ?timeout, "flow still transmitting");
            break metric;
        }
        std::thread::sleep(POLL_INTERVAL);
    };

    let loss = loss_pct(&metric)?;
    info!(%flow, tx = metric.frames_tx, rx = metric.frames_rx, %loss,
        "flow counters");
    Ok(loss)
}

// Waits until the neighbor entry of every emulated interface of the given
// family is resolved.
pub fn wait_for_arp<G>(
    generator: &mut G,
    config: &Config,
    af: AddressFamily,
    timeout: Duration,
) -> Result<(), Error>
where
    G: TrafficGenerator + ?Sized,
{
    let ethernet_names = config.ethernet_names();
    let deadline = Instant::now() + timeout;
    loop {
        let neighbors = match af {
            AddressFamily::Ipv4 => {
                generator.ipv4_neighbors(ethernet_names.clone())?
            }
            AddressFamily::Ipv6 => {
                generator.ipv6_neighbors(ethernet_names.clone())?
            }
        };
        let resolved = ethernet_names.iter().all(|name| {
            neighbors.iter().any(|neighbor| {
                neighbor.ethernet_name == *name
                    && neighbor.link_layer_address.is_some()
            })
        });
        if resolved {
            debug!(%af, "neighbors resolved");
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(Error::Timeout(format!("{af} neighbors"), timeout));
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

// Computes the loss percentage of a flow.
pub fn loss_pct(metric: &FlowMetric) -> Result<f64, Error> {
    if metric.frames_tx == 0 {
        return Err(Error::NoTraffic(metric.name.clone()));
    }
    let lost = metric.frames_tx.saturating_sub(metric.frames_rx);
    Ok(lost as f64 * 100.0 / metric.frames_tx as f64)
}

// ===== unit tests =====
