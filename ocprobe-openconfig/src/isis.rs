//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use ocprobe_utils::ip::AddressFamily;
use ocprobe_utils::protocol::InstallProtocol;
use ocprobe_utils::yang::{identity, strip_module_prefix};
use serde::{Deserialize, Serialize};

use crate::local_routing::{ProtocolConfig, protocol_path};
use crate::path::Path;

// IS-IS levels an instance or interface operates at.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum LevelType {
    #[serde(rename = "LEVEL_1")]
    Level1,
    #[serde(rename = "LEVEL_2")]
    Level2,
    #[serde(rename = "LEVEL_1_2")]
    Level12,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum CircuitType {
    #[serde(rename = "POINT_TO_POINT")]
    PointToPoint,
    #[serde(rename = "BROADCAST")]
    Broadcast,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum MetricStyle {
    #[serde(rename = "NARROW_METRIC")]
    Narrow,
    #[serde(rename = "WIDE_METRIC")]
    Wide,
}

// IS-IS protocol instance.
#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct IsisProtocol {
    #[serde(with = "identity")]
    pub identifier: InstallProtocol,
    pub name: String,
    pub config: ProtocolConfig,
    pub isis: Isis,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Isis {
    pub global: Global,
    pub levels: Levels,
    pub interfaces: Interfaces,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Global {
    pub config: GlobalConfig,
    pub afi_safi: AfiSafis,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct GlobalConfig {
    pub net: Vec<String>,
    pub level_capability: LevelType,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct AfiSafis {
    #[serde(default, rename = "af")]
    pub entries: Vec<AfiSafi>,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AfiSafi {
    pub afi_name: String,
    pub safi_name: String,
    pub config: AfiSafiConfig,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AfiSafiConfig {
    pub afi_name: String,
    pub safi_name: String,
    pub enabled: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Levels {
    #[serde(default, rename = "level")]
    pub entries: Vec<Level>,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Level {
    pub level_number: u8,
    pub config: LevelConfig,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LevelConfig {
    pub level_number: u8,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_style: Option<MetricStyle>,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Interfaces {
    #[serde(default, rename = "interface")]
    pub entries: Vec<Interface>,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Interface {
    pub interface_id: String,
    pub config: InterfaceConfig,
    pub levels: Levels,
    pub afi_safi: AfiSafis,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct InterfaceConfig {
    pub interface_id: String,
    pub enabled: bool,
    pub circuit_type: CircuitType,
}

// Adjacencies of an interface at one level, as reported by the device.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Adjacencies {
    #[serde(default, rename = "adjacency")]
    pub entries: Vec<Adjacency>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Adjacency {
    pub system_id: String,
    pub state: AdjacencyState,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AdjacencyState {
    #[serde(default)]
    pub system_id: Option<String>,
    pub adjacency_state: String,
}

// ===== impl IsisProtocol =====

impl IsisProtocol {
    // Creates a single-level IS-IS instance with wide metrics and IPv4/IPv6
    // unicast enabled on every given point-to-point interface.
    pub fn new(
        name: &str,
        net: &str,
        level: u8,
        interfaces: &[&str],
    ) -> IsisProtocol {
        let level_capability = match level {
            1 => LevelType::Level1,
            _ => LevelType::Level2,
        };

        IsisProtocol {
            identifier: InstallProtocol::ISIS,
            name: name.to_owned(),
            config: ProtocolConfig {
                identifier: InstallProtocol::ISIS,
                name: name.to_owned(),
            },
            isis: Isis {
                global: Global {
                    config: GlobalConfig {
                        net: vec![net.to_owned()],
                        level_capability,
                    },
                    afi_safi: unicast_afi_safis(),
                },
                levels: Levels {
                    entries: vec![Level::new(level, Some(MetricStyle::Wide))],
                },
                interfaces: Interfaces {
                    entries: interfaces
                        .iter()
                        .map(|name| Interface {
                            interface_id: (*name).to_owned(),
                            config: InterfaceConfig {
                                interface_id: (*name).to_owned(),
                                enabled: true,
                                circuit_type: CircuitType::PointToPoint,
                            },
                            levels: Levels {
                                entries: vec![Level::new(level, None)],
                            },
                            afi_safi: unicast_afi_safis(),
                        })
                        .collect(),
                },
            },
        }
    }
}

// ===== impl Adjacencies =====

impl Adjacencies {
    // Returns whether any adjacency is up.
    pub fn is_up(&self) -> bool {
        self.entries
            .iter()
            .any(|adj| strip_module_prefix(&adj.state.adjacency_state) == "UP")
    }
}

// ===== impl Level =====

impl Level {
    fn new(level_number: u8, metric_style: Option<MetricStyle>) -> Level {
        Level {
            level_number,
            config: LevelConfig {
                level_number,
                enabled: true,
                metric_style,
            },
        }
    }
}

// ===== helper functions =====

fn unicast_afi_safis() -> AfiSafis {
    let entries = [AddressFamily::Ipv4, AddressFamily::Ipv6]
        .into_iter()
        .map(|af| {
            let afi_name = format!("openconfig-isis-types:{af}");
            let safi_name = "openconfig-isis-types:UNICAST".to_owned();
            AfiSafi {
                afi_name: afi_name.clone(),
                safi_name: safi_name.clone(),
                config: AfiSafiConfig {
                    afi_name,
                    safi_name,
                    enabled: true,
                },
            }
        })
        .collect();
    AfiSafis { entries }
}

// ===== global functions =====

// Path of an IS-IS protocol instance.
pub fn path(network_instance: &str, name: &str) -> Path {
    protocol_path(network_instance, InstallProtocol::ISIS, name)
}

// Path of the adjacencies of an interface at the given level.
pub fn adjacencies_path(
    network_instance: &str,
    name: &str,
    interface: &str,
    level: u8,
) -> Path {
    path(network_instance, name)
        .elem("isis")
        .elem("interfaces")
        .keyed("interface", [("interface-id", interface.to_owned())])
        .elem("levels")
        .keyed("level", [("level-number", level.to_string())])
        .elem("adjacencies")
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode() {
        let isis =
            IsisProtocol::new("DEFAULT", "49.0001.1920.0000.2001.00", 2, &[
                "port1",
            ]);
        let value = serde_json::to_value(&isis).unwrap();
        assert_eq!(value["identifier"], "openconfig-policy-types:ISIS");
        assert_eq!(
            value["isis"]["global"]["config"]["level-capability"],
            "LEVEL_2"
        );
        assert_eq!(
            value["isis"]["global"]["afi-safi"]["af"][1]["afi-name"],
            "openconfig-isis-types:IPV6"
        );
        let iface = &value["isis"]["interfaces"]["interface"][0];
        assert_eq!(iface["config"]["circuit-type"], "POINT_TO_POINT");
        assert_eq!(iface["levels"]["level"][0]["level-number"], 2);
    }

    #[test]
    fn adjacency_state() {
        let adjs: Adjacencies = serde_json::from_value(serde_json::json!({
            "adjacency": [{
                "system-id": "6400.0000.0001",
                "state": {
                    "system-id": "6400.0000.0001",
                    "adjacency-state": "INIT"
                }
            }]
        }))
        .unwrap();
        assert!(!adjs.is_up());

        let mut adjs = adjs;
        adjs.entries[0].state.adjacency_state = "UP".to_owned();
        assert!(adjs.is_up());
        assert!(!Adjacencies::default().is_up());
    }

    #[test]
    fn adjacency_path() {
        assert_eq!(
            adjacencies_path("DEFAULT", "DEFAULT", "port1", 2).to_string(),
            "/network-instances/network-instance[name=DEFAULT]/protocols/protocol[identifier=ISIS][name=DEFAULT]/isis/interfaces/interface[interface-id=port1]/levels/level[level-number=2]/adjacencies"
        );
    }
}
