// Copyright (C) 2025 Pokerhost Developers
// SPDX-License-Identifier: Apache-2.0

//! Player actions and legal actions derivation.
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::{error::EngineError, poker::Chips};

/// A betting action.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Give up the hand.
    Fold,
    /// Pass without betting.
    Check,
    /// Match the largest bet.
    Call,
    /// Open the betting.
    Bet,
    /// Increase the largest bet.
    Raise,
}

impl Action {
    /// The action label.
    pub fn label(&self) -> &'static str {
        match self {
            Action::Fold => "fold",
            Action::Check => "check",
            Action::Call => "call",
            Action::Bet => "bet",
            Action::Raise => "raise",
        }
    }

    /// Checks if this action needs a bet size.
    pub fn is_sized(&self) -> bool {
        matches!(self, Action::Bet | Action::Raise)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fold" => Ok(Action::Fold),
            "check" => Ok(Action::Check),
            "call" => Ok(Action::Call),
            "bet" => Ok(Action::Bet),
            "raise" => Ok(Action::Raise),
            _ => Err(format!("unknown action {s:?}")),
        }
    }
}

/// The range of a bet or raise, amounts are the seat total bet for the round.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipRange {
    /// Minimum amount.
    pub min: Chips,
    /// Maximum amount, that is an all in.
    pub max: Chips,
}

impl ChipRange {
    /// Checks if the amount is in this range.
    pub fn contains(&self, amount: Chips) -> bool {
        self.min <= amount && amount <= self.max
    }
}

/// The actions available to the seat to act.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalActions {
    /// The legal actions.
    pub actions: Vec<Action>,
    /// The bet or raise range if bet or raise are legal.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub chip_range: Option<ChipRange>,
}

impl LegalActions {
    /// Derives the legal actions for a seat.
    ///
    /// `stack` and `bet` are the seat chips behind and committed in this round,
    /// `round_max` the largest bet in the round and `min_raise` the smallest
    /// legal raise increment.
    pub fn derive(
        stack: Chips,
        bet: Chips,
        round_max: Chips,
        min_raise: Chips,
        big_blind: Chips,
    ) -> Self {
        let shortfall = round_max - bet;
        let mut actions = Vec::with_capacity(3);
        let mut chip_range = None;

        if !shortfall.is_zero() {
            actions.push(Action::Fold);
        } else {
            actions.push(Action::Check);
        }

        if !shortfall.is_zero() && !stack.is_zero() {
            actions.push(Action::Call);
        }

        if round_max.is_zero() && !stack.is_zero() {
            actions.push(Action::Bet);
            chip_range = Some(ChipRange {
                min: big_blind.min(stack),
                max: stack,
            });
        }

        if !round_max.is_zero() && stack > shortfall {
            let max = bet + stack;
            actions.push(Action::Raise);
            chip_range = Some(ChipRange {
                min: (round_max + min_raise).min(max),
                max,
            });
        }

        Self {
            actions,
            chip_range,
        }
    }

    /// Checks if an action is legal.
    pub fn contains(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }

    /// The action used when a decision is missing or invalid, fold or check
    /// when fold is not legal.
    pub fn fallback(&self) -> Action {
        if self.contains(Action::Fold) {
            Action::Fold
        } else {
            Action::Check
        }
    }

    /// Validates an action and its amount.
    ///
    /// Returns the amount to apply, zero for actions that are not sized.
    pub fn validate(&self, action: Action, amount: Chips) -> Result<Chips, EngineError> {
        if !self.contains(action) {
            return Err(EngineError::IllegalAction(action));
        }

        if !action.is_sized() {
            return Ok(Chips::ZERO);
        }

        match self.chip_range {
            Some(range) if range.contains(amount) => Ok(amount),
            Some(range) => Err(EngineError::IllegalBetSize {
                amount,
                min: range.min,
                max: range.max,
            }),
            None => Err(EngineError::IllegalAction(action)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derive(stack: u32, bet: u32, round_max: u32, min_raise: u32) -> LegalActions {
        LegalActions::derive(
            Chips::new(stack),
            Chips::new(bet),
            Chips::new(round_max),
            Chips::new(min_raise),
            Chips::new(100),
        )
    }

    fn range(min: u32, max: u32) -> Option<ChipRange> {
        Some(ChipRange {
            min: Chips::new(min),
            max: Chips::new(max),
        })
    }

    #[test]
    fn facing_big_blind() {
        let legal = derive(2000, 0, 100, 100);
        assert_eq!(legal.actions, vec![Action::Fold, Action::Call, Action::Raise]);
        assert_eq!(legal.chip_range, range(200, 2000));
        assert_eq!(legal.fallback(), Action::Fold);
    }

    #[test]
    fn big_blind_option() {
        let legal = derive(1900, 100, 100, 100);
        assert_eq!(legal.actions, vec![Action::Check, Action::Raise]);
        assert_eq!(legal.chip_range, range(200, 2000));
        assert_eq!(legal.fallback(), Action::Check);
    }

    #[test]
    fn unopened_round() {
        let legal = derive(500, 0, 0, 100);
        assert_eq!(legal.actions, vec![Action::Check, Action::Bet]);
        assert_eq!(legal.chip_range, range(100, 500));

        // Short stack can only bet all in.
        let legal = derive(60, 0, 0, 100);
        assert_eq!(legal.chip_range, range(60, 60));
    }

    #[test]
    fn short_stack_cannot_raise() {
        // Calling puts the seat all in.
        let legal = derive(80, 0, 100, 100);
        assert_eq!(legal.actions, vec![Action::Fold, Action::Call]);
        assert_eq!(legal.chip_range, None);

        // Raise all in below the minimum raise.
        let legal = derive(150, 0, 100, 100);
        assert_eq!(legal.actions, vec![Action::Fold, Action::Call, Action::Raise]);
        assert_eq!(legal.chip_range, range(150, 150));
    }

    #[test]
    fn derive_is_deterministic() {
        assert_eq!(derive(1234, 50, 300, 200), derive(1234, 50, 300, 200));
    }

    #[test]
    fn validate_actions() {
        let legal = derive(2000, 0, 100, 100);
        assert_eq!(legal.validate(Action::Call, Chips::new(7)), Ok(Chips::ZERO));
        assert_eq!(
            legal.validate(Action::Check, Chips::ZERO),
            Err(EngineError::IllegalAction(Action::Check))
        );
        assert_eq!(
            legal.validate(Action::Raise, Chips::new(150)),
            Err(EngineError::IllegalBetSize {
                amount: Chips::new(150),
                min: Chips::new(200),
                max: Chips::new(2000),
            })
        );
        assert_eq!(
            legal.validate(Action::Raise, Chips::new(2000)),
            Ok(Chips::new(2000))
        );
    }

    #[test]
    fn legal_actions_json() {
        let json = serde_json::to_string(&derive(2000, 0, 100, 100)).unwrap();
        assert_eq!(
            json,
            r#"{"actions":["fold","call","raise"],"chipRange":{"min":200,"max":2000}}"#
        );

        let json = serde_json::to_string(&derive(1900, 100, 100, 100).actions).unwrap();
        assert_eq!(json, r#"["check","raise"]"#);

        assert_eq!("Raise".parse::<Action>(), Ok(Action::Raise));
        assert!("allin".parse::<Action>().is_err());
    }
}
