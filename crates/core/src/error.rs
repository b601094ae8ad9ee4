// Copyright (C) 2025 Pokerhost Developers
// SPDX-License-Identifier: Apache-2.0

//! Table engine errors.
use thiserror::Error;

use crate::{
    engine::Action,
    poker::{Chips, SeatIndex},
};

/// Errors returned by [TableEngine](crate::TableEngine) operations.
///
/// A failed operation leaves the engine state unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The action is not in the legal actions of the seat to act.
    #[error("action {0} is not legal")]
    IllegalAction(Action),
    /// The action label is not a known action.
    #[error("unknown action {0:?}")]
    UnknownAction(String),
    /// The bet or raise amount is outside the legal range.
    #[error("bet size {amount} outside range {min}..={max}")]
    IllegalBetSize {
        /// The requested amount.
        amount: Chips,
        /// The minimum legal amount.
        min: Chips,
        /// The maximum legal amount.
        max: Chips,
    },
    /// A seat operation that is not valid in the current state.
    #[error("invalid operation on seat {seat}: {reason}")]
    InvalidSeatOperation {
        /// The seat the operation was for.
        seat: SeatIndex,
        /// Why the operation was rejected.
        reason: &'static str,
    },
    /// The operation is not valid in the current hand phase.
    #[error("invalid operation: {0}")]
    InvalidState(&'static str),
    /// Fewer than two seats can be dealt in.
    #[error("not enough players to start a hand, {0} seated with chips")]
    InsufficientPlayers(usize),
    /// The chips on the table do not add up to the chips at the hand start.
    #[error("chip accounting violation: expected {expected} found {found}")]
    ChipAccounting {
        /// The chips at the start of the hand.
        expected: Chips,
        /// The chips currently on the table.
        found: Chips,
    },
}

impl EngineError {
    pub(crate) fn seat(seat: SeatIndex, reason: &'static str) -> Self {
        EngineError::InvalidSeatOperation { seat, reason }
    }
}
