//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use std::time::Duration;

use tracing::{error, warn};

// Traffic generator errors.
#[derive(Debug)]
pub enum Error {
    // Client setup
    Runtime(std::io::Error),
    Client(reqwest::Error),
    // API
    Http(String, reqwest::Error),
    Api(String, u16, Vec<String>),
    UnexpectedResponse(String),
    // Configuration
    MissingAddress(String),
    UnknownFlow(String),
    // Measurements
    Timeout(String, Duration),
    NoTraffic(String),
}

// ===== impl Error =====

impl Error {
    pub fn log(&self) {
        match self {
            Error::Runtime(error) => {
                error!(error = %with_source(error), "{}", self);
            }
            Error::Client(error) => {
                error!(error = %with_source(error), "{}", self);
            }
            Error::Http(endpoint, error) => {
                warn!(%endpoint, error = %with_source(error), "{}", self);
            }
            Error::Api(endpoint, status, errors) => {
                warn!(%endpoint, %status, ?errors, "{}", self);
            }
            Error::UnexpectedResponse(endpoint) => {
                warn!(%endpoint, "{}", self);
            }
            Error::MissingAddress(name) => {
                warn!(%name, "{}", self);
            }
            Error::UnknownFlow(flow) | Error::NoTraffic(flow) => {
                warn!(%flow, "{}", self);
            }
            Error::Timeout(what, timeout) => {
                warn!(%what, ?timeout, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Runtime(..) => {
                write!(f, "failed to create async runtime")
            }
            Error::Client(..) => {
                write!(f, "failed to create HTTP client")
            }
            Error::Http(..) => {
                write!(f, "OTG request failed")
            }
            Error::Api(_, status, errors) => {
                write!(
                    f,
                    "OTG request rejected ({status}): {}",
                    errors.join("; ")
                )
            }
            Error::UnexpectedResponse(..) => {
                write!(f, "unexpected OTG response")
            }
            Error::MissingAddress(name) => {
                write!(f, "device {name} lacks an address of that family")
            }
            Error::UnknownFlow(flow) => {
                write!(f, "unknown flow {flow}")
            }
            Error::Timeout(what, ..) => {
                write!(f, "timed out waiting for {what}")
            }
            Error::NoTraffic(flow) => {
                write!(f, "flow {flow} transmitted no frames")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Runtime(error) => Some(error),
            Error::Client(error) | Error::Http(_, error) => Some(error),
            _ => None,
        }
    }
}

// ===== global functions =====

fn with_source<E: std::error::Error>(error: E) -> String {
    if let Some(source) = error.source() {
        format!("{} ({})", error, with_source(source))
    } else {
        error.to_string()
    }
}
