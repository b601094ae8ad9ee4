// Copyright (C) 2025 Pokerhost Developers
// SPDX-License-Identifier: Apache-2.0

//! Main and side pots.
use serde::{Deserialize, Serialize};

use crate::poker::{Chips, SeatIndex};

/// A pot and the seats that can win it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pot {
    /// The pot chips.
    pub size: Chips,
    /// The seats eligible to win this pot in index order.
    pub eligible: Vec<SeatIndex>,
}

/// The chips a seat collected into the pots.
#[derive(Debug, Clone, Copy)]
pub struct Contribution {
    /// The seat.
    pub seat: SeatIndex,
    /// The chips collected.
    pub amount: Chips,
    /// The seat folded, its chips count but it is not eligible.
    pub folded: bool,
    /// The seat is all in.
    pub all_in: bool,
}

/// Builds the main pot and side pots from the seats contributions.
///
/// A new pot starts at every distinct all in amount of a seat still in the
/// hand, so that a seat is eligible only for the pots it fully matched.
pub fn build_pots(contributions: &[Contribution]) -> Vec<Pot> {
    let mut levels = contributions
        .iter()
        .filter(|c| c.all_in && !c.folded && !c.amount.is_zero())
        .map(|c| c.amount)
        .collect::<Vec<_>>();

    let top = contributions
        .iter()
        .map(|c| c.amount)
        .max()
        .unwrap_or_default();
    levels.push(top);
    levels.sort();
    levels.dedup();

    let mut pots: Vec<Pot> = Vec::with_capacity(levels.len());
    let mut prev = Chips::ZERO;

    for level in levels {
        let size = contributions
            .iter()
            .map(|c| c.amount.min(level) - c.amount.min(prev))
            .sum::<Chips>();

        let eligible = contributions
            .iter()
            .filter(|c| !c.folded && c.amount >= level)
            .map(|c| c.seat)
            .collect::<Vec<_>>();

        prev = level;

        if size.is_zero() {
            continue;
        }

        match pots.last_mut() {
            // Chips nobody still in the hand can win go to the previous pot.
            Some(last) if eligible.is_empty() => last.size += size,
            _ => pots.push(Pot { size, eligible }),
        }
    }

    for pot in &mut pots {
        pot.eligible.sort_unstable();
    }

    pots
}
