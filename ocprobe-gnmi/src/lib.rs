//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

//! Blocking gNMI client used to push OpenConfig configuration to the device
//! under test and to read back its configuration and state.

pub mod batch;
pub mod client;
pub mod error;
#[cfg(feature = "testing")]
pub mod testing;
mod tree;

pub use batch::{SetBatch, SetOperation};
pub use client::{
    Capabilities, ConnectOptions, Credentials, DataType, GnmiClient, Target,
    TargetExt, TlsOptions, Update,
};
pub use error::Error;
