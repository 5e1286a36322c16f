//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use std::time::{Duration, Instant};

use ocprobe_gnmi::{SetBatch, Target, TargetExt};
use ocprobe_openconfig::interfaces::{self, Interface};
use ocprobe_openconfig::isis::{self, Adjacencies, IsisProtocol};
use ocprobe_otg::model::{
    Config, Device, IsisAdvanced, IsisBasic, IsisInterface, IsisLevelType,
    IsisNetworkType, IsisRouter, Port,
};
use ocprobe_otg::{TrafficGenerator, TrafficGeneratorExt, monitor};
use ocprobe_utils::ip::AddressFamily;
use tracing::{debug, info};

use crate::attrs::{ATE_ISIS, ATE_TRAFFIC, DUT_ISIS, DUT_TRAFFIC};
use crate::deviations::{Deviations, Testbed};
use crate::error::Error;

// IS-IS level of the session.
pub const ISIS_LEVEL: u8 = 2;
// DUT IS-IS area and system ID.
pub const DUT_AREA_ADDRESS: &str = "49.0001";
pub const DUT_SYSTEM_ID: &str = "1920.0000.2001";
// ATE IS-IS area and system ID.
pub const ATE_AREA_ADDRESS: &str = "49.0002";
pub const ATE_SYSTEM_ID: &str = "640000000001";
// Names of the emulated IS-IS router and its interface.
pub const ATE_ISIS_ROUTER: &str = "devIsis";
pub const ATE_ISIS_INTERFACE: &str = "devIsisPort1";
pub const ATE_ISIS_HOSTNAME: &str = "ixia-c-port1";
pub const ATE_ISIS_METRIC: u32 = 10;

// Names of the ATE ports.
pub const ATE_PORT1: &str = "port1";
pub const ATE_PORT2: &str = "port2";

// Interval between two consecutive adjacency polls.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

// DUT and ATE connected by two links: an IS-IS link (port1) and a traffic
// source link (port2).
#[derive(Debug)]
pub struct TestSession<T, G> {
    pub dut: T,
    pub ate: G,
    pub testbed: Testbed,
    pub deviations: Deviations,
    // Baseline DUT configuration.
    pub dut_interfaces: Vec<Interface>,
    pub dut_isis: Option<IsisProtocol>,
    // ATE topology.
    pub ate_top: Config,
}

// ===== impl TestSession =====

impl<T, G> TestSession<T, G>
where
    T: Target,
    G: TrafficGenerator,
{
    // Creates a session with both links addressed and no routing protocol.
    pub fn new(
        dut: T,
        ate: G,
        testbed: Testbed,
        deviations: Deviations,
    ) -> TestSession<T, G> {
        let dut_interfaces = vec![
            Interface::ethernet(
                &testbed.dut_port1,
                Some(DUT_ISIS.desc),
                &DUT_ISIS.networks(),
            ),
            Interface::ethernet(
                &testbed.dut_port2,
                Some(DUT_TRAFFIC.desc),
                &DUT_TRAFFIC.networks(),
            ),
        ];

        let ate_top = Config {
            ports: vec![
                Port {
                    name: ATE_PORT1.to_owned(),
                    location: testbed.ate_port1.clone(),
                },
                Port {
                    name: ATE_PORT2.to_owned(),
                    location: testbed.ate_port2.clone(),
                },
            ],
            devices: vec![
                ATE_ISIS.to_otg_device(ATE_PORT1, &DUT_ISIS),
                ATE_TRAFFIC.to_otg_device(ATE_PORT2, &DUT_TRAFFIC),
            ],
            flows: vec![],
        };

        TestSession {
            dut,
            ate,
            testbed,
            deviations,
            dut_interfaces,
            dut_isis: None,
            ate_top,
        }
    }

    // Adds IS-IS on the port1 link of both the DUT and the ATE.
    pub fn with_isis(mut self) -> TestSession<T, G> {
        let net = format!("{DUT_AREA_ADDRESS}.{DUT_SYSTEM_ID}.00");
        self.dut_isis = Some(IsisProtocol::new(
            &self.deviations.isis_instance_name,
            &net,
            ISIS_LEVEL,
            &[self.testbed.dut_port1.as_str()],
        ));

        if let Some(device) = self.ate_top.device_mut(ATE_ISIS.name) {
            device.isis = Some(IsisRouter {
                name: ATE_ISIS_ROUTER.to_owned(),
                system_id: ATE_SYSTEM_ID.to_owned(),
                basic: IsisBasic {
                    ipv4_te_router_id: ATE_ISIS.ipv4.to_string(),
                    hostname: ATE_ISIS_HOSTNAME.to_owned(),
                    enable_wide_metric: true,
                },
                advanced: IsisAdvanced {
                    area_addresses: vec![ATE_AREA_ADDRESS.replace('.', "")],
                    enable_hello_padding: true,
                },
                interfaces: vec![IsisInterface {
                    name: ATE_ISIS_INTERFACE.to_owned(),
                    eth_name: ATE_ISIS.ethernet_name(),
                    network_type: IsisNetworkType::PointToPoint,
                    level_type: IsisLevelType::Level2,
                    metric: ATE_ISIS_METRIC,
                }],
                v4_routes: vec![],
                v6_routes: vec![],
            });
        }

        self
    }

    // Emulated device attached to the IS-IS link.
    pub fn ate_isis_device(&mut self) -> Option<&mut Device> {
        self.ate_top.device_mut(ATE_ISIS.name)
    }

    // Emulated IS-IS router, once `with_isis` was called.
    pub fn ate_isis_router(&mut self) -> Option<&mut IsisRouter> {
        self.ate_isis_device().and_then(|device| device.isis.as_mut())
    }

    // Pushes the baseline DUT configuration in a single Set() request.
    pub fn push_dut(&mut self) -> Result<(), Error> {
        let mut batch = SetBatch::new();
        for iface in &self.dut_interfaces {
            batch.replace(interfaces::path(&iface.name), iface)?;
        }
        if let Some(isis) = &self.dut_isis {
            let ni = &self.deviations.default_network_instance;
            let path = isis::path(ni, &isis.name);
            batch.update(path, isis)?;
        }

        info!(operations = batch.len(), "pushing DUT configuration");
        self.dut.set(&batch)?;
        Ok(())
    }

    // Pushes the ATE topology and starts its protocols.
    pub fn push_and_start(&mut self) -> Result<(), Error> {
        info!(
            devices = self.ate_top.devices.len(),
            flows = self.ate_top.flows.len(),
            "pushing ATE configuration"
        );
        self.ate.set_config(&self.ate_top)?;
        self.ate.start_protocols()?;
        Ok(())
    }

    // Waits for the IS-IS adjacency of the DUT on the port1 link to come up.
    pub fn must_adjacency(
        &mut self,
        timeout: Duration,
    ) -> Result<Adjacencies, Error> {
        let isis = self.dut_isis.as_ref().ok_or(Error::IsisNotConfigured)?;
        let path = isis::adjacencies_path(
            &self.deviations.default_network_instance,
            &isis.name,
            &self.testbed.dut_port1,
            ISIS_LEVEL,
        );

        let deadline = Instant::now() + timeout;
        loop {
            let adjacencies: Option<Adjacencies> =
                self.dut.lookup_state(&path)?;
            match adjacencies {
                Some(adjacencies) if adjacencies.is_up() => {
                    info!(interface = %self.testbed.dut_port1,
                        "IS-IS adjacency is up");
                    return Ok(adjacencies);
                }
                _ => debug!(%path, "IS-IS adjacency not up yet"),
            }
            if Instant::now() >= deadline {
                return Err(Error::AdjacencyTimeout(
                    self.testbed.dut_port1.clone(),
                    timeout,
                ));
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    // Waits until the ATE resolved its neighbors of the given family on
    // every link.
    pub fn wait_for_arp(
        &mut self,
        af: AddressFamily,
        timeout: Duration,
    ) -> Result<(), Error> {
        monitor::wait_for_arp(&mut self.ate, &self.ate_top, af, timeout)?;
        Ok(())
    }
}
