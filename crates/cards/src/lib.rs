// Copyright (C) 2025 Pokerhost Developers
// SPDX-License-Identifier: Apache-2.0

//! Pokerhost cards types.
//!
//! This crate define types to create cards:
//!
//! ```
//! # use pokerhost_cards::{Card, Rank, Suit};
//! let ah = Card::new(Rank::Ace, Suit::Hearts);
//! let kd: Card = "KD".parse().unwrap();
//! assert_eq!(kd.rank(), Rank::King);
//! assert_ne!(ah, kd);
//! ```
//!
//! and a [Deck] type for shuffling, dealing, and iterating cards in the deck.
//!
//! For example to count all 5 cards hands:
//!
//! ```no_run
//! # use pokerhost_cards::Deck;
//! let mut counter = 0;
//! Deck::default().for_each(5, |hand| {
//!     counter += 1;
//! });
//! assert_eq!(counter, 2_598_960);
//! ```
//!
//! Cards serialize as `{"rank": "A", "suit": "hearts"}` objects, the format
//! used by the table views sent to remote players.
#![warn(clippy::all, rust_2018_idioms, missing_docs)]
mod deck;
pub use deck::{Card, Deck, ParseCardError, Rank, Suit};
