//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, debug_span, trace, warn};

use crate::error::Error;
use crate::model::{
    Config, ControlState, FlowMetric, FlowMetricsRequest, IsisMetric,
    IsisMetricsRequest, MetricsRequest, MetricsResponse, Neighbor,
    NeighborsRequest, Response, State, StatesRequest, StatesResponse,
};

// Control interface of an OTG-compatible traffic generator.
pub trait TrafficGenerator {
    // Replaces the whole ATE configuration.
    fn set_config(&mut self, config: &Config) -> Result<(), Error>;

    // Changes the state of protocols or traffic.
    fn set_control_state(&mut self, state: &ControlState) -> Result<(), Error>;

    fn metrics(
        &mut self,
        request: &MetricsRequest,
    ) -> Result<MetricsResponse, Error>;

    fn states(&mut self, request: &StatesRequest)
    -> Result<StatesResponse, Error>;
}

// Convenience operations on top of `TrafficGenerator`.
pub trait TrafficGeneratorExt: TrafficGenerator {
    fn start_protocols(&mut self) -> Result<(), Error> {
        self.set_control_state(&ControlState::protocols(State::Start))
    }

    fn start_traffic(&mut self) -> Result<(), Error> {
        self.set_control_state(&ControlState::traffic(State::Start))
    }

    fn stop_traffic(&mut self) -> Result<(), Error> {
        self.set_control_state(&ControlState::traffic(State::Stop))
    }

    fn flow_metrics(
        &mut self,
        flows: &[&str],
    ) -> Result<Vec<FlowMetric>, Error> {
        let request = MetricsRequest::Flow {
            flow: FlowMetricsRequest {
                flow_names: flows
                    .iter()
                    .map(|flow| (*flow).to_owned())
                    .collect(),
            },
        };
        match self.metrics(&request)? {
            MetricsResponse::FlowMetrics { flow_metrics } => Ok(flow_metrics),
            _ => Err(Error::UnexpectedResponse("/monitor/metrics".to_owned())),
        }
    }

    fn isis_metrics(
        &mut self,
        routers: &[&str],
    ) -> Result<Vec<IsisMetric>, Error> {
        let request = MetricsRequest::Isis {
            isis: IsisMetricsRequest {
                router_names: routers
                    .iter()
                    .map(|router| (*router).to_owned())
                    .collect(),
            },
        };
        match self.metrics(&request)? {
            MetricsResponse::IsisMetrics { isis_metrics } => Ok(isis_metrics),
            _ => Err(Error::UnexpectedResponse("/monitor/metrics".to_owned())),
        }
    }

    fn ipv4_neighbors(
        &mut self,
        ethernet_names: Vec<String>,
    ) -> Result<Vec<Neighbor>, Error> {
        let request = StatesRequest::Ipv4Neighbors {
            ipv4_neighbors: NeighborsRequest { ethernet_names },
        };
        match self.states(&request)? {
            StatesResponse::Ipv4Neighbors { ipv4_neighbors } => {
                Ok(ipv4_neighbors)
            }
            _ => Err(Error::UnexpectedResponse("/monitor/states".to_owned())),
        }
    }

    fn ipv6_neighbors(
        &mut self,
        ethernet_names: Vec<String>,
    ) -> Result<Vec<Neighbor>, Error> {
        let request = StatesRequest::Ipv6Neighbors {
            ipv6_neighbors: NeighborsRequest { ethernet_names },
        };
        match self.states(&request)? {
            StatesResponse::Ipv6Neighbors { ipv6_neighbors } => {
                Ok(ipv6_neighbors)
            }
            _ => Err(Error::UnexpectedResponse("/monitor/states".to_owned())),
        }
    }
}

impl<T: TrafficGenerator + ?Sized> TrafficGeneratorExt for T {}

#[derive(Clone, Debug, Default)]
pub struct ClientOptions {
    pub timeout: Option<Duration>,
    // Accept self-signed controller certificates.
    pub insecure: bool,
}

// Blocking client of the OTG HTTP API.
//
// The client must be dropped before the runtime, hence the field order.
#[derive(Debug)]
pub struct OtgClient {
    base_url: String,
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

// ===== impl OtgClient =====

impl OtgClient {
    pub fn new(
        base_url: &str,
        options: &ClientOptions,
    ) -> Result<OtgClient, Error> {
        // Initialize tokio runtime.
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::Runtime)?;

        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(options.insecure);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(Error::Client)?;

        Ok(OtgClient {
            base_url: base_url.trim_end_matches('/').to_owned(),
            client,
            runtime,
        })
    }

    fn post<Req, Resp>(
        &mut self,
        endpoint: &str,
        body: &Req,
    ) -> Result<Resp, Error>
    where
        Req: Serialize + std::fmt::Debug,
        Resp: DeserializeOwned,
    {
        let span = debug_span!("otg", url = %self.base_url);
        let _span_guard = span.enter();
        debug!(%endpoint, "sending request");
        trace!("{:?}", body);

        let url = format!("{}{}", self.base_url, endpoint);
        let client = &self.client;
        let http_error = |error: reqwest::Error| {
            Error::Http(endpoint.to_owned(), error)
        };
        let (status, bytes) = self.runtime.block_on(async {
            let response = client
                .post(&url)
                .json(body)
                .send()
                .await
                .map_err(http_error)?;
            let status = response.status();
            let bytes = response.bytes().await.map_err(http_error)?;
            Ok::<_, Error>((status, bytes))
        })?;

        if !status.is_success() {
            let response: Response =
                serde_json::from_slice(&bytes).unwrap_or_default();
            return Err(Error::Api(
                endpoint.to_owned(),
                status.as_u16(),
                response.errors,
            ));
        }

        let bytes: &[u8] = if bytes.is_empty() { b"{}" } else { &bytes };
        serde_json::from_slice(bytes)
            .map_err(|_| Error::UnexpectedResponse(endpoint.to_owned()))
    }
}

impl TrafficGenerator for OtgClient {
    fn set_config(&mut self, config: &Config) -> Result<(), Error> {
        let response: Response = self.post("/config", config)?;
        for warning in response.warnings {
            warn!(%warning, "OTG configuration warning");
        }
        Ok(())
    }

    fn set_control_state(&mut self, state: &ControlState) -> Result<(), Error> {
        let response: Response = self.post("/control/state", state)?;
        for warning in response.warnings {
            warn!(%warning, "OTG control warning");
        }
        Ok(())
    }

    fn metrics(
        &mut self,
        request: &MetricsRequest,
    ) -> Result<MetricsResponse, Error> {
        self.post("/monitor/metrics", request)
    }

    fn states(
        &mut self,
        request: &StatesRequest,
    ) -> Result<StatesResponse, Error> {
        self.post("/monitor/states", request)
    }
}
