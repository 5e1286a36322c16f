//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::IpAddr;

use derive_new::new;
use ipnetwork::IpNetwork;
use ocprobe_utils::ip::AddressFamily;

use crate::error::Error;
use crate::model::{
    Config, EthernetHeader, Flow, FlowHeader, FlowMetricsConfig, FlowRouter,
    FlowTxRx, IpHeader, IsisRouter, IsisV4Route, IsisV6Route, Pattern,
    RouteAddress,
};

// Offset and length of the egress tracking tag (low bits of the MAC).
pub const TRACKING_TAG_OFFSET: u32 = 36;
pub const TRACKING_TAG_LENGTH: u32 = 12;

// Parameters of a traffic flow between two emulated devices.
#[derive(Clone, Debug, new)]
pub struct FlowParams<'a> {
    pub name: &'a str,
    pub af: AddressFamily,
    // Transmitting device, sourcing from its first interface address.
    pub tx_device: &'a str,
    // Receiving device.
    pub rx_device: &'a str,
    pub src_mac: &'a str,
    // First destination address, incremented by one per packet.
    pub dst_start: IpAddr,
    pub dst_count: u32,
    // Name of the egress MAC tracking tag.
    pub tracking_tag: &'a str,
}

// ===== global functions =====

// Builds a flow from the parameters, resolving the endpoint addresses from
// the devices of the ATE configuration.
pub fn device_flow(
    config: &Config,
    params: &FlowParams<'_>,
) -> Result<Flow, Error> {
    let (tx_name, src) = endpoint(config, params.tx_device, params.af)?;
    let (rx_name, _) = endpoint(config, params.rx_device, params.af)?;

    let ip = IpHeader {
        src: Some(Pattern::value(src)),
        dst: Some(Pattern::increment(
            params.dst_start.to_string(),
            increment_step(params.af),
            params.dst_count,
        )),
    };
    let ip = match params.af {
        AddressFamily::Ipv4 => FlowHeader::Ipv4 { ipv4: ip },
        AddressFamily::Ipv6 => FlowHeader::Ipv6 { ipv6: ip },
    };

    Ok(Flow {
        name: params.name.to_owned(),
        tx_rx: FlowTxRx {
            choice: "device".to_owned(),
            device: FlowRouter {
                tx_names: vec![tx_name],
                rx_names: vec![rx_name],
            },
        },
        packet: vec![
            FlowHeader::Ethernet {
                ethernet: EthernetHeader {
                    src: Some(Pattern::value(params.src_mac)),
                    dst: None,
                },
            },
            ip,
        ],
        egress_packet: vec![FlowHeader::Ethernet {
            ethernet: EthernetHeader {
                src: None,
                dst: Some(Pattern::metric_tag(
                    params.tracking_tag,
                    TRACKING_TAG_OFFSET,
                    TRACKING_TAG_LENGTH,
                )),
            },
        }],
        metrics: FlowMetricsConfig { enable: true },
    })
}

// Adds a route advertised by an emulated IS-IS router.
pub fn advertise_route(
    router: &mut IsisRouter,
    name: &str,
    prefix: IpNetwork,
    link_metric: u32,
) {
    let addresses = vec![RouteAddress {
        address: prefix.network().to_string(),
        prefix: prefix.prefix(),
    }];
    match prefix {
        IpNetwork::V4(_) => router.v4_routes.push(IsisV4Route {
            name: name.to_owned(),
            link_metric,
            addresses,
        }),
        IpNetwork::V6(_) => router.v6_routes.push(IsisV6Route {
            name: name.to_owned(),
            link_metric,
            addresses,
        }),
    }
}

// ===== helper functions =====

// Returns the name and address of the first interface address of the given
// family on a device.
fn endpoint(
    config: &Config,
    device: &str,
    af: AddressFamily,
) -> Result<(String, String), Error> {
    let eth = config
        .device(device)
        .and_then(|device| device.ethernets.first())
        .ok_or_else(|| Error::MissingAddress(device.to_owned()))?;
    let addr = match af {
        AddressFamily::Ipv4 => eth
            .ipv4_addresses
            .first()
            .map(|addr| (addr.name.clone(), addr.address.clone())),
        AddressFamily::Ipv6 => eth
            .ipv6_addresses
            .first()
            .map(|addr| (addr.name.clone(), addr.address.clone())),
    };
    addr.ok_or_else(|| Error::MissingAddress(device.to_owned()))
}

fn increment_step(af: AddressFamily) -> &'static str {
    match af {
        AddressFamily::Ipv4 => "0.0.0.1",
        AddressFamily::Ipv6 => "::1",
    }
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use const_addrs::{ip4, ip6};

    use super::*;
    use crate::model::{
        Device, Ethernet, EthernetConnection, IsisAdvanced, IsisBasic,
        Ipv4Address, Ipv6Address,
    };

    fn device(name: &str, v4: &str, v6: &str) -> Device {
        Device {
            name: name.to_owned(),
            ethernets: vec![Ethernet {
                name: format!("{name}.Eth"),
                connection: EthernetConnection {
                    choice: "port_name".to_owned(),
                    port_name: "port".to_owned(),
                },
                mac: "02:00:02:01:01:01".to_owned(),
                mtu: 1500,
                ipv4_addresses: vec![Ipv4Address {
                    name: format!("{name}.IPv4"),
                    address: v4.to_owned(),
                    gateway: "192.0.2.5".to_owned(),
                    prefix: 30,
                }],
                ipv6_addresses: vec![Ipv6Address {
                    name: format!("{name}.IPv6"),
                    address: v6.to_owned(),
                    gateway: "2001:db8::192:0:2:5".to_owned(),
                    prefix: 126,
                }],
            }],
            isis: None,
        }
    }

    fn config() -> Config {
        Config {
            devices: vec![
                device("ate1", "192.0.2.2", "2001:db8::192:0:2:2"),
                device("ate2", "192.0.2.6", "2001:db8::192:0:2:6"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn ipv6_flow() {
        let params = FlowParams::new(
            "v6Flow",
            AddressFamily::Ipv6,
            "ate2",
            "ate1",
            "02:00:02:01:01:01",
            ip6!("2024:db8:128:128::1").into(),
            1,
            "MACTrackingv6",
        );
        let flow = device_flow(&config(), &params).unwrap();

        assert_eq!(flow.tx_rx.device.tx_names, ["ate2.IPv6"]);
        assert_eq!(flow.tx_rx.device.rx_names, ["ate1.IPv6"]);
        let FlowHeader::Ipv6 { ipv6 } = &flow.packet[1] else {
            panic!("unexpected header");
        };
        assert_eq!(
            ipv6.src.as_ref().unwrap().value.as_deref(),
            Some("2001:db8::192:0:2:6")
        );
        let counter = ipv6.dst.as_ref().unwrap().increment.as_ref().unwrap();
        assert_eq!(counter.start, "2024:db8:128:128::1");
        assert_eq!(counter.step, "::1");
        assert_eq!(counter.count, 1);
        let FlowHeader::Ethernet { ethernet } = &flow.egress_packet[0] else {
            panic!("unexpected header");
        };
        let tag = &ethernet.dst.as_ref().unwrap().metric_tags[0];
        assert_eq!(tag.name, "MACTrackingv6");
        assert_eq!((tag.offset, tag.length), (36, 12));
        assert!(flow.metrics.enable);
    }

    #[test]
    fn missing_device() {
        let params = FlowParams::new(
            "v4Flow",
            AddressFamily::Ipv4,
            "ate3",
            "ate1",
            "02:00:02:01:01:01",
            ip4!("192.168.10.1").into(),
            254,
            "MACTrackingv4",
        );
        assert!(matches!(
            device_flow(&config(), &params),
            Err(Error::MissingAddress(name)) if name == "ate3"
        ));
    }

    #[test]
    fn advertised_routes() {
        let mut router = IsisRouter {
            name: "devIsis".to_owned(),
            system_id: "640000000001".to_owned(),
            basic: IsisBasic {
                ipv4_te_router_id: "192.0.2.2".to_owned(),
                hostname: "ixia-c-port1".to_owned(),
                enable_wide_metric: true,
            },
            advanced: IsisAdvanced {
                area_addresses: vec!["490002".to_owned()],
                enable_hello_padding: true,
            },
            interfaces: vec![],
            v4_routes: vec![],
            v6_routes: vec![],
        };
        let v4 = IpNetwork::new(ip4!("192.168.1.4").into(), 30).unwrap();
        let v6 = IpNetwork::new(ip6!("2001:db8::").into(), 126).unwrap();
        advertise_route(&mut router, "v4-isisNet-dev1", v4, 10);
        advertise_route(&mut router, "v6-isisNet-dev1", v6, 10);

        assert_eq!(router.v4_routes[0].addresses[0].address, "192.168.1.4");
        assert_eq!(router.v4_routes[0].addresses[0].prefix, 30);
        assert_eq!(router.v6_routes[0].name, "v6-isisNet-dev1");
        assert_eq!(router.v6_routes[0].addresses[0].address, "2001:db8::");
        assert_eq!(router.v6_routes[0].link_metric, 10);
    }
}
