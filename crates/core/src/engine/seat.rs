// Copyright (C) 2025 Pokerhost Developers
// SPDX-License-Identifier: Apache-2.0

//! Table seats.
use std::collections::BTreeMap;

use crate::poker::{Card, Chips, SeatIndex};

/// An occupied seat state.
#[derive(Debug, Clone)]
pub struct Seat {
    index: SeatIndex,
    pub(crate) stack: Chips,
    pub(crate) bet: Chips,
    pub(crate) committed: Chips,
    pub(crate) folded: bool,
    pub(crate) all_in: bool,
    pub(crate) acted: bool,
    pub(crate) in_hand: bool,
    pub(crate) revealed: bool,
    pub(crate) hole_cards: Option<[Card; 2]>,
}

impl Seat {
    fn new(index: SeatIndex, stack: Chips) -> Self {
        Self {
            index,
            stack,
            bet: Chips::ZERO,
            committed: Chips::ZERO,
            folded: false,
            all_in: false,
            acted: false,
            in_hand: false,
            revealed: false,
            hole_cards: None,
        }
    }

    /// The seat index.
    pub fn index(&self) -> SeatIndex {
        self.index
    }

    /// The chips behind.
    pub fn stack(&self) -> Chips {
        self.stack
    }

    /// The chips bet in the current round.
    pub fn bet(&self) -> Chips {
        self.bet
    }

    /// The chips committed in the current hand, including the current bet.
    pub fn committed(&self) -> Chips {
        self.committed
    }

    /// Stack and bet.
    pub fn total_chips(&self) -> Chips {
        self.stack + self.bet
    }

    /// Checks if this seat folded.
    pub fn is_folded(&self) -> bool {
        self.folded
    }

    /// Checks if this seat is all in.
    pub fn is_all_in(&self) -> bool {
        self.all_in
    }

    /// Checks if this seat was dealt in the current hand.
    pub fn is_in_hand(&self) -> bool {
        self.in_hand
    }

    /// Checks if the seat can still win chips in this hand.
    pub fn is_contending(&self) -> bool {
        self.in_hand && !self.folded
    }

    /// Checks if the hole cards are visible to everyone.
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// The hole cards if dealt.
    pub fn hole_cards(&self) -> Option<[Card; 2]> {
        self.hole_cards
    }

    /// Moves chips from the stack to the bet, the seat goes all in if the stack
    /// is not enough. Returns the chips moved.
    pub(crate) fn put(&mut self, chips: Chips) -> Chips {
        let chips = chips.min(self.stack);
        self.stack -= chips;
        self.bet += chips;
        self.committed += chips;
        if self.stack.is_zero() && self.in_hand {
            self.all_in = true;
        }
        chips
    }

    /// Moves chips from the stack to the committed chips without betting.
    pub(crate) fn put_ante(&mut self, chips: Chips) -> Chips {
        let chips = chips.min(self.stack);
        self.stack -= chips;
        self.committed += chips;
        if self.stack.is_zero() {
            self.all_in = true;
        }
        chips
    }

    /// Takes back chips from the bet.
    pub(crate) fn take_back(&mut self, chips: Chips) {
        let chips = chips.min(self.bet);
        self.bet -= chips;
        self.committed -= chips;
        self.stack += chips;
        if !self.stack.is_zero() {
            self.all_in = false;
        }
    }

    /// Resets the state for a new hand.
    pub(crate) fn start_hand(&mut self) {
        self.bet = Chips::ZERO;
        self.committed = Chips::ZERO;
        self.folded = false;
        self.all_in = false;
        self.acted = false;
        self.in_hand = !self.stack.is_zero();
        self.revealed = false;
        self.hole_cards = None;
    }

    /// Resets the state at the hand end keeping cards for display.
    pub(crate) fn end_hand(&mut self) {
        self.bet = Chips::ZERO;
        self.committed = Chips::ZERO;
        self.acted = false;
    }
}

/// The occupied seats at a table.
#[derive(Debug, Clone)]
pub struct Seats {
    capacity: usize,
    seats: BTreeMap<SeatIndex, Seat>,
}

impl Seats {
    /// Creates empty seats.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            seats: BTreeMap::new(),
        }
    }

    /// The number of seats at the table.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of occupied seats.
    pub fn count(&self) -> usize {
        self.seats.len()
    }

    /// Checks if a seat is occupied.
    pub fn is_occupied(&self, index: SeatIndex) -> bool {
        self.seats.contains_key(&index)
    }

    /// Sits a stack at an empty seat.
    pub(crate) fn insert(&mut self, index: SeatIndex, stack: Chips) {
        self.seats.insert(index, Seat::new(index, stack));
    }

    /// Removes a seat.
    pub(crate) fn remove(&mut self, index: SeatIndex) -> Option<Seat> {
        self.seats.remove(&index)
    }

    /// Returns a seat.
    pub fn get(&self, index: SeatIndex) -> Option<&Seat> {
        self.seats.get(&index)
    }

    /// Returns a mutable seat.
    pub(crate) fn get_mut(&mut self, index: SeatIndex) -> Option<&mut Seat> {
        self.seats.get_mut(&index)
    }

    /// Returns an iterator over the occupied seats in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Seat> {
        self.seats.values()
    }

    /// Returns a mutable iterator over the occupied seats in index order.
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Seat> {
        self.seats.values_mut()
    }

    /// The empty seat indices.
    pub fn empty(&self) -> impl Iterator<Item = SeatIndex> + '_ {
        (0..self.capacity).filter(|idx| !self.seats.contains_key(idx))
    }

    /// Iterates the occupied seats clockwise starting after `from`, `from`
    /// itself comes last if occupied.
    pub fn clockwise_after(&self, from: SeatIndex) -> impl Iterator<Item = &Seat> {
        self.seats
            .range(from + 1..)
            .chain(self.seats.range(..=from))
            .map(|(_, seat)| seat)
    }

    /// The first seat clockwise after `from` matching the predicate.
    pub fn next_after<P>(&self, from: SeatIndex, pred: P) -> Option<SeatIndex>
    where
        P: Fn(&Seat) -> bool,
    {
        self.clockwise_after(from)
            .find(|seat| pred(seat))
            .map(Seat::index)
    }
}
