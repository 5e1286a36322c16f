//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use ocprobe_utils::ip::AddressFamily;
use ocprobe_utils::policy::PolicyResult;
use ocprobe_utils::protocol::InstallProtocol;
use ocprobe_utils::yang::{ToYang, identity};
use serde::{Deserialize, Serialize};

use crate::path::{self, Path};

// Binding between a source and a destination protocol for one address
// family. Routes of the source protocol are redistributed into the
// destination protocol, filtered by the import policies.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TableConnection {
    #[serde(with = "identity")]
    pub src_protocol: InstallProtocol,
    #[serde(with = "identity")]
    pub dst_protocol: InstallProtocol,
    #[serde(with = "identity")]
    pub address_family: AddressFamily,
    pub config: TableConnectionConfig,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TableConnectionConfig {
    #[serde(with = "identity")]
    pub src_protocol: InstallProtocol,
    #[serde(with = "identity")]
    pub dst_protocol: InstallProtocol,
    #[serde(with = "identity")]
    pub address_family: AddressFamily,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub import_policy: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_import_policy: Option<PolicyResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_metric_propagation: Option<bool>,
}

// ===== impl TableConnection =====

impl TableConnection {
    pub fn new(
        src_protocol: InstallProtocol,
        dst_protocol: InstallProtocol,
        address_family: AddressFamily,
    ) -> TableConnection {
        TableConnection {
            src_protocol,
            dst_protocol,
            address_family,
            config: TableConnectionConfig {
                src_protocol,
                dst_protocol,
                address_family,
                import_policy: vec![],
                default_import_policy: None,
                disable_metric_propagation: None,
            },
        }
    }

    pub fn set_import_policy(&mut self, policies: &[&str]) {
        self.config.import_policy =
            policies.iter().map(|policy| (*policy).to_owned()).collect();
    }

    pub fn set_disable_metric_propagation(&mut self, value: bool) {
        self.config.disable_metric_propagation = Some(value);
    }
}

// ===== impl TableConnectionConfig =====

impl TableConnectionConfig {
    // Value of the disable-metric-propagation leaf, taking its schema default
    // into account.
    pub fn metric_propagation_disabled(&self) -> bool {
        self.disable_metric_propagation.unwrap_or(false)
    }
}

// ===== global functions =====

// Path of a table connection.
pub fn path(
    network_instance: &str,
    src_protocol: InstallProtocol,
    dst_protocol: InstallProtocol,
    address_family: AddressFamily,
) -> Path {
    path::network_instance(network_instance)
        .elem("table-connections")
        .keyed(
            "table-connection",
            [
                ("src-protocol", src_protocol.to_yang_key().into_owned()),
                ("dst-protocol", dst_protocol.to_yang_key().into_owned()),
                ("address-family", address_family.to_yang_key().into_owned()),
            ],
        )
}

// Path of the intended configuration of a table connection.
pub fn config_path(
    network_instance: &str,
    src_protocol: InstallProtocol,
    dst_protocol: InstallProtocol,
    address_family: AddressFamily,
) -> Path {
    path(network_instance, src_protocol, dst_protocol, address_family)
        .elem("config")
}

// Path of the applied state of a table connection.
pub fn state_path(
    network_instance: &str,
    src_protocol: InstallProtocol,
    dst_protocol: InstallProtocol,
    address_family: AddressFamily,
) -> Path {
    path(network_instance, src_protocol, dst_protocol, address_family)
        .elem("state")
}

// Builds the table connections of both address families, starting with the
// given one. Each connection uses the same import policy.
//
// The disable-metric-propagation leaf is left unset when `None` is given,
// for devices that don't support it.
pub fn table_connections(
    network_instance: &str,
    src_protocol: InstallProtocol,
    dst_protocol: InstallProtocol,
    address_family: AddressFamily,
    import_policy: &str,
    disable_metric_propagation: Option<bool>,
) -> Vec<(Path, TableConnection)> {
    [address_family, address_family.other()]
        .into_iter()
        .map(|af| {
            let mut conn = TableConnection::new(src_protocol, dst_protocol, af);
            conn.set_import_policy(&[import_policy]);
            if let Some(value) = disable_metric_propagation {
                conn.set_disable_metric_propagation(value);
            }
            let path = path(network_instance, src_protocol, dst_protocol, af);
            (path, conn)
        })
        .collect()
}

// ===== unit tests =====
