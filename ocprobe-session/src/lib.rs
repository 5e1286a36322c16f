//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

//! Two-link DUT/ATE topology with an IS-IS adjacency on the first link.

pub mod attrs;
pub mod deviations;
pub mod error;
pub mod session;

pub use deviations::{Deviations, Testbed};
pub use error::Error;
pub use session::TestSession;
