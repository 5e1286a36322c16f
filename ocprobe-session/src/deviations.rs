//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

#![allow(clippy::derivable_impls)]

use serde::Deserialize;

// Per-device departures from the expected OpenConfig behavior.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Deviations {
    // Name of the default network instance.
    pub default_network_instance: String,
    // Name of the static routing protocol instance.
    pub static_protocol_name: String,
    // Name of the IS-IS protocol instance.
    pub isis_instance_name: String,
    // Leave the disable-metric-propagation leaf of table connections unset.
    pub skip_setting_disable_metric_propagation: bool,
}

// Names of the DUT interfaces and locations of the ATE ports.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Testbed {
    pub dut_port1: String,
    pub dut_port2: String,
    pub ate_port1: Option<String>,
    pub ate_port2: Option<String>,
}

// ===== impl Deviations =====

impl Default for Deviations {
    fn default() -> Deviations {
        Deviations {
            default_network_instance: "DEFAULT".to_owned(),
            static_protocol_name: "DEFAULT".to_owned(),
            isis_instance_name: "DEFAULT".to_owned(),
            skip_setting_disable_metric_propagation: false,
        }
    }
}

// ===== impl Testbed =====

impl Default for Testbed {
    fn default() -> Testbed {
        Testbed {
            dut_port1: "port1".to_owned(),
            dut_port2: "port2".to_owned(),
            ate_port1: None,
            ate_port2: None,
        }
    }
}
