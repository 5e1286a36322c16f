//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

//! OpenConfig configuration fragments pushed to the device under test.
//!
//! Every fragment serializes to RFC 7951 JSON (the gNMI `JSON_IETF`
//! encoding), with identityref values qualified by their defining module.

pub mod error;
pub mod interfaces;
pub mod isis;
pub mod local_routing;
pub mod path;
pub mod routing_policy;
pub mod table_connection;

pub use error::Error;
pub use path::{Path, PathElem};
