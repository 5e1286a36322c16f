//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::IpAddr;

use derive_new::new;
use ipnetwork::IpNetwork;
use ocprobe_utils::ip::{IpAddrExt, IpNetworkExt};
use ocprobe_utils::protocol::InstallProtocol;
use ocprobe_utils::yang::{ToYang, identity};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::path::{self, Path};
use crate::routing_policy::TagValue;

// Static routing protocol instance.
#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StaticProtocol {
    #[serde(with = "identity")]
    pub identifier: InstallProtocol,
    pub name: String,
    pub config: ProtocolConfig,
    #[serde(default)]
    pub static_routes: StaticRoutes,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct ProtocolConfig {
    #[serde(with = "identity")]
    pub identifier: InstallProtocol,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct StaticRoutes {
    #[serde(default, rename = "static")]
    pub entries: Vec<StaticRoute>,
}

// Static route.
#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StaticRoute {
    pub prefix: String,
    pub config: StaticRouteConfig,
    #[serde(default)]
    pub next_hops: NextHops,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StaticRouteConfig {
    pub prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_tag: Option<TagValue>,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct NextHops {
    #[serde(default, rename = "next-hop")]
    pub entries: Vec<NextHop>,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct NextHop {
    pub index: String,
    pub config: NextHopConfig,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct NextHopConfig {
    pub index: String,
    pub next_hop: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<u32>,
}

// Parameters of a static route with a single next-hop.
#[derive(Clone, Debug, Eq, PartialEq, new)]
pub struct StaticRouteParams {
    pub prefix: IpNetwork,
    pub tag: u32,
    pub next_hop: IpAddr,
    pub metric: u32,
}

// ===== impl StaticProtocol =====

impl StaticProtocol {
    pub fn new(name: &str) -> StaticProtocol {
        StaticProtocol {
            identifier: InstallProtocol::STATIC,
            name: name.to_owned(),
            config: ProtocolConfig {
                identifier: InstallProtocol::STATIC,
                name: name.to_owned(),
            },
            static_routes: Default::default(),
        }
    }

    pub fn route(&self, prefix: &IpNetwork) -> Option<&StaticRoute> {
        let prefix = prefix.to_cidr();
        self.static_routes
            .entries
            .iter()
            .find(|route| route.prefix == prefix)
    }

    // Adds a static route, replacing any existing route to the same prefix.
    pub fn add_route(
        &mut self,
        params: &StaticRouteParams,
    ) -> Result<(), Error> {
        if params.prefix.address_family() != params.next_hop.address_family() {
            return Err(Error::AddressFamilyMismatch(params.prefix.to_cidr()));
        }

        let prefix = params.prefix.to_cidr();
        let route = StaticRoute {
            prefix: prefix.clone(),
            config: StaticRouteConfig {
                prefix: prefix.clone(),
                set_tag: Some(TagValue::Numeric(params.tag)),
            },
            next_hops: NextHops {
                entries: vec![NextHop {
                    index: "0".to_owned(),
                    config: NextHopConfig {
                        index: "0".to_owned(),
                        next_hop: params.next_hop.to_string(),
                        metric: Some(params.metric),
                    },
                }],
            },
        };

        let entries = &mut self.static_routes.entries;
        match entries.iter_mut().find(|route| route.prefix == prefix) {
            Some(entry) => *entry = route,
            None => entries.push(route),
        }

        Ok(())
    }
}

// ===== global functions =====

// Path of a routing protocol instance.
pub fn protocol_path(
    network_instance: &str,
    identifier: InstallProtocol,
    name: &str,
) -> Path {
    path::network_instance(network_instance)
        .elem("protocols")
        .keyed(
            "protocol",
            [
                ("identifier", identifier.to_yang_key().into_owned()),
                ("name", name.to_owned()),
            ],
        )
}

// Builds a static protocol instance holding the given routes.
pub fn static_routes(
    name: &str,
    routes: &[StaticRouteParams],
) -> Result<StaticProtocol, Error> {
    let mut protocol = StaticProtocol::new(name);
    for route in routes {
        protocol.add_route(route)?;
    }
    Ok(protocol)
}

// ===== unit tests =====
