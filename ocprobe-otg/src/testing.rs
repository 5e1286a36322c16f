//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use crate::client::TrafficGenerator;
use crate::error::Error;
use crate::model::{
    Config, ControlState, FlowMetric, IsisMetric, MetricsRequest,
    MetricsResponse, Neighbor, State, StatesRequest, StatesResponse,
    TransmitState,
};

// Link-layer address reported for resolved neighbors.
pub const NEIGHBOR_MAC: &str = "02:1a:c5:00:00:01";

// In-memory traffic generator with scripted counters.
#[derive(Debug)]
pub struct MemoryGenerator {
    // Last configuration pushed.
    pub config: Option<Config>,
    // Every control state change received, in order.
    pub control_states: Vec<ControlState>,
    // Counters reported for each flow.
    pub flow_metrics: Vec<FlowMetric>,
    pub isis_metrics: Vec<IsisMetric>,
    // Whether neighbor entries are reported as resolved.
    pub resolve_neighbors: bool,
    // Whether traffic is currently being transmitted.
    pub transmitting: bool,
}

// ===== impl MemoryGenerator =====

impl MemoryGenerator {
    pub fn new() -> MemoryGenerator {
        MemoryGenerator::default()
    }

    // Scripts the counters of a flow.
    pub fn set_flow_counters(&mut self, flow: &str, tx: u64, rx: u64) {
        self.flow_metrics.retain(|metric| metric.name != flow);
        self.flow_metrics.push(FlowMetric {
            name: flow.to_owned(),
            transmit: None,
            frames_tx: tx,
            frames_rx: rx,
        });
    }

    fn neighbors(&self, names: &[String], ipv4: bool) -> Vec<Neighbor> {
        let Some(config) = &self.config else {
            return vec![];
        };
        config
            .devices
            .iter()
            .flat_map(|device| device.ethernets.iter())
            .filter(|eth| names.contains(&eth.name))
            .map(|eth| {
                let address = if ipv4 {
                    eth.ipv4_addresses.first().map(|addr| &addr.gateway)
                } else {
                    eth.ipv6_addresses.first().map(|addr| &addr.gateway)
                };
                Neighbor {
                    ethernet_name: eth.name.clone(),
                    address: address.cloned().unwrap_or_default(),
                    link_layer_address: self
                        .resolve_neighbors
                        .then(|| NEIGHBOR_MAC.to_owned()),
                }
            })
            .collect()
    }
}

impl Default for MemoryGenerator {
    fn default() -> MemoryGenerator {
        MemoryGenerator {
            config: None,
            control_states: vec![],
            flow_metrics: vec![],
            isis_metrics: vec![],
            resolve_neighbors: true,
            transmitting: false,
        }
    }
}

impl TrafficGenerator for MemoryGenerator {
    fn set_config(&mut self, config: &Config) -> Result<(), Error> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn set_control_state(&mut self, state: &ControlState) -> Result<(), Error> {
        if let ControlState::Traffic { traffic } = state {
            self.transmitting = traffic.flow_transmit.state == State::Start;
        }
        self.control_states.push(state.clone());
        Ok(())
    }

    fn metrics(
        &mut self,
        request: &MetricsRequest,
    ) -> Result<MetricsResponse, Error> {
        match request {
            MetricsRequest::Flow { flow } => {
                let transmit = if self.transmitting {
                    TransmitState::Started
                } else {
                    TransmitState::Stopped
                };
                let flow_metrics = self
                    .flow_metrics
                    .iter()
                    .filter(|metric| flow.flow_names.contains(&metric.name))
                    .map(|metric| FlowMetric {
                        transmit: Some(transmit),
                        ..metric.clone()
                    })
                    .collect();
                Ok(MetricsResponse::FlowMetrics { flow_metrics })
            }
            MetricsRequest::Isis { isis } => {
                let isis_metrics = self
                    .isis_metrics
                    .iter()
                    .filter(|metric| isis.router_names.contains(&metric.name))
                    .cloned()
                    .collect();
                Ok(MetricsResponse::IsisMetrics { isis_metrics })
            }
        }
    }

    fn states(
        &mut self,
        request: &StatesRequest,
    ) -> Result<StatesResponse, Error> {
        match request {
            StatesRequest::Ipv4Neighbors { ipv4_neighbors } => {
                Ok(StatesResponse::Ipv4Neighbors {
                    ipv4_neighbors: self
                        .neighbors(&ipv4_neighbors.ethernet_names, true),
                })
            }
            StatesRequest::Ipv6Neighbors { ipv6_neighbors } => {
                Ok(StatesResponse::Ipv6Neighbors {
                    ipv6_neighbors: self
                        .neighbors(&ipv6_neighbors.ethernet_names, false),
                })
            }
        }
    }
}
