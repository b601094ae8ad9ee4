// Copyright (C) 2025 Pokerhost Developers
// SPDX-License-Identifier: Apache-2.0

//! Pokerhost table server.
#![warn(clippy::all, rust_2018_idioms, missing_docs)]

pub mod decision;
pub mod directory;
pub mod server;
pub use server::{Config, DirectorySource, run};
pub mod table;
