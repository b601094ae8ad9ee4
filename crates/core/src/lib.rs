// Copyright (C) 2025 Pokerhost Developers
// SPDX-License-Identifier: Apache-2.0

//! Pokerhost core types: the Texas Hold'em table engine, the views derived from
//! it, and the messages exchanged with remote players.
#![warn(clippy::all, rust_2018_idioms, missing_docs)]

pub mod engine;
pub mod error;
pub mod message;
pub mod poker;
pub mod view;

pub use engine::TableEngine;
pub use error::EngineError;
