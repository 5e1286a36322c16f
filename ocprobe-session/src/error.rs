//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use std::time::Duration;

use tracing::warn;

// Test session errors.
#[derive(Debug)]
pub enum Error {
    Gnmi(ocprobe_gnmi::Error),
    Otg(ocprobe_otg::Error),
    IsisNotConfigured,
    AdjacencyTimeout(String, Duration),
}

// ===== impl Error =====

impl Error {
    pub fn log(&self) {
        match self {
            Error::Gnmi(error) => error.log(),
            Error::Otg(error) => error.log(),
            Error::IsisNotConfigured => {
                warn!("{}", self);
            }
            Error::AdjacencyTimeout(interface, timeout) => {
                warn!(%interface, ?timeout, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Gnmi(error) => {
                write!(f, "DUT operation failed: {error}")
            }
            Error::Otg(error) => {
                write!(f, "ATE operation failed: {error}")
            }
            Error::IsisNotConfigured => {
                write!(f, "IS-IS is not part of the session")
            }
            Error::AdjacencyTimeout(interface, ..) => {
                write!(f, "IS-IS adjacency on {interface} did not come up")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Gnmi(error) => Some(error),
            Error::Otg(error) => Some(error),
            _ => None,
        }
    }
}

impl From<ocprobe_gnmi::Error> for Error {
    fn from(error: ocprobe_gnmi::Error) -> Error {
        Error::Gnmi(error)
    }
}

impl From<ocprobe_otg::Error> for Error {
    fn from(error: ocprobe_otg::Error) -> Error {
        Error::Otg(error)
    }
}
