//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use ocprobe_openconfig::Path;
use tracing::{error, warn};

// gNMI client errors.
#[derive(Debug)]
pub enum Error {
    // Connection setup
    Runtime(std::io::Error),
    TlsCertificate(String, std::io::Error),
    InvalidAddress(String),
    InvalidCredentials,
    Connect(tonic::transport::Error),
    // RPC
    Rpc(tonic::Status),
    // Encoding and decoding
    Encode(Path, serde_json::Error),
    Decode(Path, serde_json::Error),
    UnsupportedValue(Path),
    NotFound(Path),
}

// ===== impl Error =====

impl Error {
    pub fn log(&self) {
        match self {
            Error::Runtime(error) => {
                error!(error = %with_source(error), "{}", self);
            }
            Error::TlsCertificate(file, error) => {
                error!(%file, error = %with_source(error), "{}", self);
            }
            Error::InvalidAddress(address) => {
                error!(%address, "{}", self);
            }
            Error::InvalidCredentials => {
                error!("{}", self);
            }
            Error::Connect(error) => {
                error!(error = %with_source(error), "{}", self);
            }
            Error::Rpc(status) => {
                let code = status.code();
                warn!(?code, message = %status.message(), "{}", self);
            }
            Error::Encode(path, error) | Error::Decode(path, error) => {
                warn!(%path, error = %with_source(error), "{}", self);
            }
            Error::UnsupportedValue(path) | Error::NotFound(path) => {
                warn!(%path, "{}", self);
            }
        }
    }

    // Returns whether the target reported that the requested data doesn't
    // exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(..) => true,
            Error::Rpc(status) => status.code() == tonic::Code::NotFound,
            _ => false,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Runtime(..) => {
                write!(f, "failed to create async runtime")
            }
            Error::TlsCertificate(..) => {
                write!(f, "failed to read TLS certificate")
            }
            Error::InvalidAddress(..) => {
                write!(f, "invalid target address")
            }
            Error::InvalidCredentials => {
                write!(f, "credentials can't be encoded as gRPC metadata")
            }
            Error::Connect(..) => {
                write!(f, "failed to connect to gNMI target")
            }
            Error::Rpc(status) => {
                write!(f, "gNMI RPC failed: {}", status.message())
            }
            Error::Encode(..) => {
                write!(f, "failed to encode JSON_IETF value")
            }
            Error::Decode(..) => {
                write!(f, "failed to decode JSON_IETF value")
            }
            Error::UnsupportedValue(..) => {
                write!(f, "unsupported typed value")
            }
            Error::NotFound(path) => {
                write!(f, "no data at {path}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Runtime(error) | Error::TlsCertificate(_, error) => {
                Some(error)
            }
            Error::Connect(error) => Some(error),
            Error::Rpc(status) => Some(status),
            Error::Encode(_, error) | Error::Decode(_, error) => Some(error),
            _ => None,
        }
    }
}

impl From<tonic::Status> for Error {
    fn from(status: tonic::Status) -> Error {
        Error::Rpc(status)
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
