//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::warn;

// Configuration building errors.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    InvalidPath(String),
    DuplicateStatement(String, String),
    AddressFamilyMismatch(String),
}

// ===== impl Error =====

impl Error {
    pub fn log(&self) {
        match self {
            Error::InvalidPath(path) => {
                warn!(%path, "{}", self);
            }
            Error::DuplicateStatement(policy, stmt) => {
                warn!(%policy, statement = %stmt, "{}", self);
            }
            Error::AddressFamilyMismatch(name) => {
                warn!(%name, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidPath(path) => {
                write!(f, "invalid path: {path}")
            }
            Error::DuplicateStatement(policy, stmt) => {
                write!(f, "statement {stmt} already exists in policy {policy}")
            }
            Error::AddressFamilyMismatch(..) => {
                write!(f, "address family mismatch between route and next-hop")
            }
        }
    }
}

impl std::error::Error for Error {}
