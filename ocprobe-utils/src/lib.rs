//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

#![warn(rust_2018_idioms)]

pub mod ip;
pub mod policy;
pub mod protocol;
pub mod yang;
