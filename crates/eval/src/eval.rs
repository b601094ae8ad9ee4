// Copyright (C) 2025 Pokerhost Developers
// SPDX-License-Identifier: Apache-2.0

//! Poker hand evaluator.
//!
//! A five cards hand is reduced to a category and up to five tie breaking
//! ranks packed in a single integer, with 6 and 7 cards hands evaluated as the
//! best of all their five cards subsets:
//!
//! ```text
//!   +--------+--------+--------+--------+
//!   |xxxxxxxx|cccckkkk|kkkkkkkk|kkkkkkkk|
//!   +--------+--------+--------+--------+
//!   c = hand category (high card=0,...,royal flush=9)
//!   k = five 4 bits ranks ordered by importance (deuce=0,...,ace=12)
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;

use pokerhost_cards::Card;

/// A hand category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HandRank {
    /// No pair.
    #[serde(rename = "High Card")]
    HighCard = 0,
    /// One pair.
    #[serde(rename = "Pair")]
    OnePair,
    /// Two pairs.
    #[serde(rename = "Two Pair")]
    TwoPair,
    /// Three cards of the same rank.
    #[serde(rename = "Three of a Kind")]
    ThreeOfAKind,
    /// Five ranks in sequence.
    #[serde(rename = "Straight")]
    Straight,
    /// Five cards of the same suit.
    #[serde(rename = "Flush")]
    Flush,
    /// Three of a kind and a pair.
    #[serde(rename = "Full House")]
    FullHouse,
    /// Four cards of the same rank.
    #[serde(rename = "Four of a Kind")]
    FourOfAKind,
    /// A straight with all cards of the same suit.
    #[serde(rename = "Straight Flush")]
    StraightFlush,
    /// An ace high straight flush.
    #[serde(rename = "Royal Flush")]
    RoyalFlush,
}

impl HandRank {
    const ALL: [HandRank; 10] = [
        HandRank::HighCard,
        HandRank::OnePair,
        HandRank::TwoPair,
        HandRank::ThreeOfAKind,
        HandRank::Straight,
        HandRank::Flush,
        HandRank::FullHouse,
        HandRank::FourOfAKind,
        HandRank::StraightFlush,
        HandRank::RoyalFlush,
    ];

    /// Returns all the categories from the lowest to the highest.
    pub fn ranks() -> impl DoubleEndedIterator<Item = HandRank> {
        Self::ALL.into_iter()
    }

    /// The category display label.
    pub fn label(&self) -> &'static str {
        match self {
            HandRank::HighCard => "High Card",
            HandRank::OnePair => "Pair",
            HandRank::TwoPair => "Two Pair",
            HandRank::ThreeOfAKind => "Three of a Kind",
            HandRank::Straight => "Straight",
            HandRank::Flush => "Flush",
            HandRank::FullHouse => "Full House",
            HandRank::FourOfAKind => "Four of a Kind",
            HandRank::StraightFlush => "Straight Flush",
            HandRank::RoyalFlush => "Royal Flush",
        }
    }
}

impl fmt::Display for HandRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The value of a hand, a higher value wins, equal values split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandValue(u32);

impl HandValue {
    /// Evaluates a 5, 6 or 7 cards hand.
    ///
    /// Panics if the number of cards is not in the range 5..=7.
    pub fn eval(cards: &[Card]) -> HandValue {
        Self::eval_with_best_hand(cards).0
    }

    /// Evaluates a 5, 6 or 7 cards hand and returns the best five cards.
    ///
    /// Panics if the number of cards is not in the range 5..=7.
    pub fn eval_with_best_hand(cards: &[Card]) -> (HandValue, [Card; 5]) {
        let n = cards.len();
        assert!((5..=7).contains(&n), "5 <= cards <= 7");

        let mut best = (HandValue(0), [cards[0]; 5]);

        for a in 0..n - 4 {
            for b in a + 1..n - 3 {
                for c in b + 1..n - 2 {
                    for d in c + 1..n - 1 {
                        for e in d + 1..n {
                            let hand = [cards[a], cards[b], cards[c], cards[d], cards[e]];
                            let value = eval5(&hand);
                            if value > best.0 {
                                best = (value, hand);
                            }
                        }
                    }
                }
            }
        }

        best
    }

    /// Returns the hand category.
    pub fn rank(&self) -> HandRank {
        HandRank::ALL[(self.0 >> 20) as usize & 0xf]
    }
}

/// Evaluates five cards.
fn eval5(cards: &[Card; 5]) -> HandValue {
    let mut counts = [0u8; 13];
    let mut mask = 0u16;
    for card in cards {
        let rank = card.rank() as usize;
        counts[rank] += 1;
        mask |= 1 << rank;
    }

    let is_flush = cards.iter().all(|c| c.suit() == cards[0].suit());
    let straight = straight_high(mask);

    // Group ranks by count and then by rank, both descending.
    let mut groups = [(0u8, 0u8); 5];
    let mut len = 0;
    for rank in (0..13).rev() {
        if counts[rank] > 0 {
            groups[len] = (counts[rank], rank as u8);
            len += 1;
        }
    }
    let groups = &mut groups[..len];
    groups.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

    let (category, kickers) = match (straight, is_flush) {
        (Some(12), true) => (HandRank::RoyalFlush, [12, 0, 0, 0, 0]),
        (Some(high), true) => (HandRank::StraightFlush, [high, 0, 0, 0, 0]),
        (Some(high), false) => (HandRank::Straight, [high, 0, 0, 0, 0]),
        (None, _) => {
            let category = match (groups[0].0, groups[1].0) {
                (4, _) => HandRank::FourOfAKind,
                (3, 2) => HandRank::FullHouse,
                _ if is_flush => HandRank::Flush,
                (3, _) => HandRank::ThreeOfAKind,
                (2, 2) => HandRank::TwoPair,
                (2, _) => HandRank::OnePair,
                _ => HandRank::HighCard,
            };

            let mut kickers = [0u8; 5];
            for (k, g) in kickers.iter_mut().zip(groups.iter()) {
                *k = g.1;
            }

            (category, kickers)
        }
    };

    let value = kickers
        .iter()
        .fold(category as u32, |acc, &k| (acc << 4) | k as u32);

    HandValue(value)
}

/// Returns the highest rank of a straight in the ranks mask.
fn straight_high(mask: u16) -> Option<u8> {
    const WHEEL: u16 = 0b1_0000_0000_1111;

    (4..13u8)
        .rev()
        .find(|&high| (mask >> (high - 4)) & 0x1f == 0x1f)
        .or_else(|| (mask == WHEEL).then_some(3))
}
