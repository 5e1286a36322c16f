//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

//! Static route to IS-IS redistribution conformance test.
//!
//! The device under test is configured over gNMI with OpenConfig, while an
//! Open Traffic Generator emulates the IS-IS neighbor and validates the
//! forwarding of the redistributed routes.

pub mod redistribution;
pub mod runner;
pub mod scenario;
pub mod verify;

pub use redistribution::Settings;
pub use runner::{Failure, Outcome, Report, Runner, Test};
