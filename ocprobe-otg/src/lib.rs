//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

//! Open Traffic Generator controller: data model, blocking HTTP client and
//! the flow, loss and neighbor helpers built on top of it.

pub mod client;
pub mod error;
pub mod flows;
pub mod model;
pub mod monitor;
#[cfg(feature = "testing")]
pub mod testing;

pub use client::{
    ClientOptions, OtgClient, TrafficGenerator, TrafficGeneratorExt,
};
pub use error::Error;
