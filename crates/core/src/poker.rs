// Copyright (C) 2025 Pokerhost Developers
// SPDX-License-Identifier: Apache-2.0

//! Types used in a Poker game.
use serde::{Deserialize, Serialize};
use std::{fmt, iter, ops};

pub use pokerhost_eval::{Card, Deck, HandRank, HandValue, Rank, Suit};

/// A seat position at the table, seats are numbered clockwise from 0.
pub type SeatIndex = usize;

/// Chips amount.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chips(u32);

impl Chips {
    /// The zero chips.
    pub const ZERO: Chips = Chips(0);

    /// Creates chips with the given value.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// The integer amount.
    pub fn amount(&self) -> u32 {
        self.0
    }

    /// Checks if this is a zero amount.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds chips, returns `None` on overflow.
    pub fn checked_add(self, rhs: Chips) -> Option<Chips> {
        self.0.checked_add(rhs.0).map(Chips)
    }
}

impl From<u32> for Chips {
    fn from(val: u32) -> Self {
        Chips(val)
    }
}

impl From<Chips> for u32 {
    fn from(val: Chips) -> Self {
        val.0
    }
}

impl ops::Add for Chips {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Chips(self.0.saturating_add(rhs.0))
    }
}

impl ops::AddAssign for Chips {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl ops::Sub<Chips> for Chips {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl ops::SubAssign for Chips {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl ops::Div<u32> for Chips {
    type Output = Self;

    fn div(self, rhs: u32) -> Self::Output {
        Self(self.0 / rhs)
    }
}

impl ops::Rem<u32> for Chips {
    type Output = Self;

    fn rem(self, rhs: u32) -> Self::Output {
        Self(self.0 % rhs)
    }
}

impl iter::Sum for Chips {
    fn sum<I: Iterator<Item = Chips>>(iter: I) -> Self {
        iter.fold(Chips::ZERO, |acc, c| acc + c)
    }
}

impl fmt::Display for Chips {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = self.0;
        if amount >= 1_000_000 {
            write!(
                f,
                "{},{:03},{:03}",
                amount / 1_000_000,
                amount % 1_000_000 / 1_000,
                amount % 1000
            )
        } else if amount >= 1_000 {
            write!(f, "{},{:03}", amount / 1000, amount % 1000)
        } else {
            write!(f, "{}", amount)
        }
    }
}

/// The forced bets posted at the start of every hand.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForcedBets {
    /// The ante posted by every seat dealt in.
    pub ante: Chips,
    /// The big blind.
    pub big_blind: Chips,
    /// The small blind.
    pub small_blind: Chips,
}

impl ForcedBets {
    /// Creates forced bets with blinds and no ante.
    pub fn blinds(small_blind: u32, big_blind: u32) -> Self {
        Self {
            ante: Chips::ZERO,
            big_blind: Chips::new(big_blind),
            small_blind: Chips::new(small_blind),
        }
    }

    /// Sets the ante.
    pub fn with_ante(mut self, ante: u32) -> Self {
        self.ante = Chips::new(ante);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chips_formatting() {
        assert_eq!(Chips(123).to_string(), "123");
        assert_eq!(Chips(1_000).to_string(), "1,000");
        assert_eq!(Chips(123_456).to_string(), "123,456");
        assert_eq!(Chips(1_234_567).to_string(), "1,234,567");
    }

    #[test]
    fn chips_sum_and_saturating_sub() {
        let total = [Chips(50), Chips(150), Chips(300)].into_iter().sum::<Chips>();
        assert_eq!(total, Chips(500));
        assert_eq!(Chips(10) - Chips(20), Chips::ZERO);
    }

    #[test]
    fn chips_addition_bounded() {
        assert_eq!(Chips(u32::MAX) + Chips(1), Chips(u32::MAX));
        assert_eq!(Chips(u32::MAX).checked_add(Chips(1)), None);
        assert_eq!(Chips(40).checked_add(Chips(2)), Some(Chips(42)));
    }

    #[test]
    fn forced_bets_json() {
        let fb = ForcedBets::blinds(5, 10).with_ante(1);
        let json = serde_json::to_string(&fb).unwrap();
        assert_eq!(json, r#"{"ante":1,"bigBlind":10,"smallBlind":5}"#);
    }
}
