// Copyright (C) 2025 Pokerhost Developers
// SPDX-License-Identifier: Apache-2.0

//! Pokerhost hand evaluator.
//!
//! Poker hand evaluator for 5, 6 and 7 cards hands. A hand value is computed
//! as the best five cards hand out of all the cards, so that hole cards and
//! community cards can be passed together:
//!
//! ```
//! # use pokerhost_eval::*;
//! let cards = |s: &str| -> Vec<Card> {
//!     s.split_whitespace().map(|c| c.parse().unwrap()).collect()
//! };
//!
//! let board = cards("2H 7D 9C KS KH");
//! let v1 = HandValue::eval(&[&cards("AC AD")[..], &board[..]].concat());
//! let v2 = HandValue::eval(&[&cards("9S 8S")[..], &board[..]].concat());
//! assert_eq!(v1.rank(), HandRank::TwoPair);
//! assert!(v1 > v2);
//! ```
#![warn(clippy::all, rust_2018_idioms, missing_docs)]
pub mod eval;
pub use eval::{HandRank, HandValue};

// Reexport cards types.
pub use pokerhost_cards::{Card, Deck, Rank, Suit};
