//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

//! Subset of the Open Traffic Generator data model.
//!
//! Choice nodes are encoded the way the OTG API expects them: a `choice`
//! member naming the selected alternative, next to a member of the same name
//! holding its value.

use serde::{Deserialize, Serialize};

// ATE configuration, pushed as a whole.
#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub flows: Vec<Flow>,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Port {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

// Emulated device.
#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Device {
    pub name: String,
    #[serde(default)]
    pub ethernets: Vec<Ethernet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isis: Option<IsisRouter>,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Ethernet {
    pub name: String,
    pub connection: EthernetConnection,
    pub mac: String,
    pub mtu: u16,
    #[serde(default)]
    pub ipv4_addresses: Vec<Ipv4Address>,
    #[serde(default)]
    pub ipv6_addresses: Vec<Ipv6Address>,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct EthernetConnection {
    pub choice: String,
    pub port_name: String,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Ipv4Address {
    pub name: String,
    pub address: String,
    pub gateway: String,
    pub prefix: u8,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Ipv6Address {
    pub name: String,
    pub address: String,
    pub gateway: String,
    pub prefix: u8,
}

// Emulated IS-IS router.
#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct IsisRouter {
    pub name: String,
    pub system_id: String,
    pub basic: IsisBasic,
    pub advanced: IsisAdvanced,
    #[serde(default)]
    pub interfaces: Vec<IsisInterface>,
    #[serde(default)]
    pub v4_routes: Vec<IsisV4Route>,
    #[serde(default)]
    pub v6_routes: Vec<IsisV6Route>,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct IsisBasic {
    pub ipv4_te_router_id: String,
    pub hostname: String,
    pub enable_wide_metric: bool,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct IsisAdvanced {
    pub area_addresses: Vec<String>,
    pub enable_hello_padding: bool,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct IsisInterface {
    pub name: String,
    pub eth_name: String,
    pub network_type: IsisNetworkType,
    pub level_type: IsisLevelType,
    pub metric: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IsisNetworkType {
    Broadcast,
    PointToPoint,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum IsisLevelType {
    #[serde(rename = "level_1")]
    Level1,
    #[serde(rename = "level_2")]
    Level2,
    #[serde(rename = "level_1_2")]
    Level12,
}

// Route advertised by an emulated IS-IS router.
#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct IsisV4Route {
    pub name: String,
    pub link_metric: u32,
    pub addresses: Vec<RouteAddress>,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct IsisV6Route {
    pub name: String,
    pub link_metric: u32,
    pub addresses: Vec<RouteAddress>,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct RouteAddress {
    pub address: String,
    pub prefix: u8,
}

// Traffic flow.
#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Flow {
    pub name: String,
    pub tx_rx: FlowTxRx,
    #[serde(default)]
    pub packet: Vec<FlowHeader>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub egress_packet: Vec<FlowHeader>,
    pub metrics: FlowMetricsConfig,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct FlowTxRx {
    pub choice: String,
    pub device: FlowRouter,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct FlowRouter {
    pub tx_names: Vec<String>,
    pub rx_names: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct FlowMetricsConfig {
    pub enable: bool,
}

// Packet header of a flow.
#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(tag = "choice", rename_all = "snake_case")]
pub enum FlowHeader {
    Ethernet { ethernet: EthernetHeader },
    Ipv4 { ipv4: IpHeader },
    Ipv6 { ipv6: IpHeader },
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct EthernetHeader {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<Pattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst: Option<Pattern>,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct IpHeader {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<Pattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst: Option<Pattern>,
}

// Value pattern of a header field.
#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Pattern {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub increment: Option<Counter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metric_tags: Vec<MetricTag>,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Counter {
    pub start: String,
    pub step: String,
    pub count: u32,
}

// Egress tracking tag.
#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct MetricTag {
    pub name: String,
    pub offset: u32,
    pub length: u32,
}

//
// Control and monitoring requests.
//

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    Start,
    Stop,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(tag = "choice", rename_all = "snake_case")]
pub enum ControlState {
    Protocol { protocol: ProtocolState },
    Traffic { traffic: TrafficState },
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct ProtocolState {
    pub choice: String,
    pub all: StateValue,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct StateValue {
    pub state: State,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct TrafficState {
    pub choice: String,
    pub flow_transmit: FlowTransmitState,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct FlowTransmitState {
    pub state: State,
    #[serde(default)]
    pub flow_names: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(tag = "choice", rename_all = "snake_case")]
pub enum MetricsRequest {
    Flow { flow: FlowMetricsRequest },
    Isis { isis: IsisMetricsRequest },
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct FlowMetricsRequest {
    pub flow_names: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct IsisMetricsRequest {
    pub router_names: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(tag = "choice", rename_all = "snake_case")]
pub enum MetricsResponse {
    FlowMetrics {
        #[serde(default)]
        flow_metrics: Vec<FlowMetric>,
    },
    IsisMetrics {
        #[serde(default)]
        isis_metrics: Vec<IsisMetric>,
    },
}

// Counters of a flow.
#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct FlowMetric {
    pub name: String,
    #[serde(default)]
    pub transmit: Option<TransmitState>,
    #[serde(default, with = "counter")]
    pub frames_tx: u64,
    #[serde(default, with = "counter")]
    pub frames_rx: u64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransmitState {
    Started,
    Stopped,
    Paused,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct IsisMetric {
    pub name: String,
    #[serde(default, with = "counter")]
    pub l1_sessions_up: u64,
    #[serde(default, with = "counter")]
    pub l2_sessions_up: u64,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(tag = "choice", rename_all = "snake_case")]
pub enum StatesRequest {
    Ipv4Neighbors { ipv4_neighbors: NeighborsRequest },
    Ipv6Neighbors { ipv6_neighbors: NeighborsRequest },
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct NeighborsRequest {
    pub ethernet_names: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(tag = "choice", rename_all = "snake_case")]
pub enum StatesResponse {
    Ipv4Neighbors {
        #[serde(default)]
        ipv4_neighbors: Vec<Neighbor>,
    },
    Ipv6Neighbors {
        #[serde(default)]
        ipv6_neighbors: Vec<Neighbor>,
    },
}

// Neighbor cache entry of an emulated interface.
#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Neighbor {
    pub ethernet_name: String,
    #[serde(default, alias = "ipv4_address", alias = "ipv6_address")]
    pub address: String,
    #[serde(default)]
    pub link_layer_address: Option<String>,
}

// Warnings and errors returned by the API.
#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Response {
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub errors: Vec<String>,
}

// ===== impl Config =====

impl Config {
    pub fn device(&self, name: &str) -> Option<&Device> {
        self.devices.iter().find(|device| device.name == name)
    }

    pub fn device_mut(&mut self, name: &str) -> Option<&mut Device> {
        self.devices.iter_mut().find(|device| device.name == name)
    }

    pub fn flow(&self, name: &str) -> Option<&Flow> {
        self.flows.iter().find(|flow| flow.name == name)
    }

    // Names of all emulated ethernet interfaces.
    pub fn ethernet_names(&self) -> Vec<String> {
        self.devices
            .iter()
            .flat_map(|device| device.ethernets.iter())
            .map(|eth| eth.name.clone())
            .collect()
    }
}

// ===== impl Pattern =====

impl Pattern {
    pub fn value(value: impl Into<String>) -> Pattern {
        Pattern {
            choice: Some("value".to_owned()),
            value: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn increment(
        start: impl Into<String>,
        step: impl Into<String>,
        count: u32,
    ) -> Pattern {
        Pattern {
            choice: Some("increment".to_owned()),
            increment: Some(Counter {
                start: start.into(),
                step: step.into(),
                count,
            }),
            ..Default::default()
        }
    }

    pub fn metric_tag(name: &str, offset: u32, length: u32) -> Pattern {
        Pattern {
            metric_tags: vec![MetricTag {
                name: name.to_owned(),
                offset,
                length,
            }],
            ..Default::default()
        }
    }
}

// ===== impl ControlState =====

impl ControlState {
    pub fn protocols(state: State) -> ControlState {
        ControlState::Protocol {
            protocol: ProtocolState {
                choice: "all".to_owned(),
                all: StateValue { state },
            },
        }
    }

    pub fn traffic(state: State) -> ControlState {
        ControlState::Traffic {
            traffic: TrafficState {
                choice: "flow_transmit".to_owned(),
                flow_transmit: FlowTransmitState {
                    state,
                    flow_names: vec![],
                },
            },
        }
    }
}

// ===== counter encoding =====

// 64-bit counters are encoded either as JSON numbers or as strings.
mod counter {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Counter {
        Number(u64),
        String(String),
    }

    pub(super) fn serialize<S>(
        value: &u64,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(*value)
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Counter::deserialize(deserializer)? {
            Counter::Number(value) => Ok(value),
            Counter::String(value) => {
                value.parse().map_err(serde::de::Error::custom)
            }
        }
    }
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn encode_headers() {
        let header = FlowHeader::Ipv4 {
            ipv4: IpHeader {
                src: Some(Pattern::value("192.0.2.6")),
                dst: Some(Pattern::increment("192.168.10.1", "0.0.0.1", 254)),
            },
        };
        assert_eq!(
            serde_json::to_value(&header).unwrap(),
            json!({
                "choice": "ipv4",
                "ipv4": {
                    "src": { "choice": "value", "value": "192.0.2.6" },
                    "dst": {
                        "choice": "increment",
                        "increment": {
                            "start": "192.168.10.1",
                            "step": "0.0.0.1",
                            "count": 254
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn encode_control_state() {
        assert_eq!(
            serde_json::to_value(ControlState::traffic(State::Stop)).unwrap(),
            json!({
                "choice": "traffic",
                "traffic": {
                    "choice": "flow_transmit",
                    "flow_transmit": { "state": "stop", "flow_names": [] }
                }
            })
        );
        assert_eq!(
            serde_json::to_value(ControlState::protocols(State::Start))
                .unwrap(),
            json!({
                "choice": "protocol",
                "protocol": { "choice": "all", "all": { "state": "start" } }
            })
        );
    }

    #[test]
    fn decode_flow_metrics() {
        let response: MetricsResponse = serde_json::from_value(json!({
            "choice": "flow_metrics",
            "flow_metrics": [{
                "name": "v4Flow",
                "transmit": "stopped",
                "frames_tx": "1000",
                "frames_rx": 995
            }]
        }))
        .unwrap();
        let MetricsResponse::FlowMetrics { flow_metrics: metrics } = response
        else {
            panic!("unexpected response");
        };
        assert_eq!(metrics[0].transmit, Some(TransmitState::Stopped));
        assert_eq!(metrics[0].frames_tx, 1000);
        assert_eq!(metrics[0].frames_rx, 995);
    }

    #[test]
    fn decode_neighbors() {
        let response: StatesResponse = serde_json::from_value(json!({
            "choice": "ipv6_neighbors",
            "ipv6_neighbors": [{
                "ethernet_name": "ate1.Eth",
                "ipv6_address": "2001:db8::192:0:2:1"
            }]
        }))
        .unwrap();
        let StatesResponse::Ipv6Neighbors { ipv6_neighbors } = response else {
            panic!("unexpected response");
        };
        assert_eq!(ipv6_neighbors[0].address, "2001:db8::192:0:2:1");
        assert_eq!(ipv6_neighbors[0].link_layer_address, None);
    }
}
