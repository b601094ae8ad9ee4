// Copyright (C) 2025 Pokerhost Developers
// SPDX-License-Identifier: Apache-2.0

//! No-limit Texas Hold'em table engine.
//!
//! The engine holds the authoritative table state: seats and stacks, forced
//! bets, button, deck, community cards, pots and the seat to act. It is a
//! synchronous state machine driven by a caller through these operations:
//!
//! ```text
//!   prehand --start_hand--> preflop --end_betting_round--> flop --> turn
//!      ^                                                              |
//!      |                                                              v
//!   posthand <--showdown-- showdown <--end_betting_round-- river <----+
//! ```
//!
//! A betting round ends when no seat needs to act, [TableEngine::end_betting_round]
//! then collects the bets into the pots and deals the next street. If a single
//! seat is left in the hand the pots are awarded and the hand goes straight to
//! posthand.
use log::debug;
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

use crate::{
    error::EngineError,
    poker::{Card, Chips, Deck, ForcedBets, HandRank, HandValue, SeatIndex},
};

mod action;
mod pot;
mod seat;

pub use action::{Action, ChipRange, LegalActions};
pub use pot::{Contribution, Pot, build_pots};
pub use seat::{Seat, Seats};

/// The hand phase.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandPhase {
    /// No hand has been dealt.
    Prehand,
    /// Hole cards dealt, first betting round.
    Preflop,
    /// Three community cards dealt.
    Flop,
    /// Fourth community card dealt.
    Turn,
    /// Fifth community card dealt.
    River,
    /// Betting is over, hands must be compared.
    Showdown,
    /// Pots have been awarded.
    Posthand,
}

impl HandPhase {
    /// The phase label.
    pub fn label(&self) -> &'static str {
        match self {
            HandPhase::Prehand => "prehand",
            HandPhase::Preflop => "preflop",
            HandPhase::Flop => "flop",
            HandPhase::Turn => "turn",
            HandPhase::River => "river",
            HandPhase::Showdown => "showdown",
            HandPhase::Posthand => "posthand",
        }
    }

    /// Checks if this is a betting phase.
    pub fn is_betting(&self) -> bool {
        matches!(
            self,
            HandPhase::Preflop | HandPhase::Flop | HandPhase::Turn | HandPhase::River
        )
    }
}

impl fmt::Display for HandPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A seat that won chips in the last hand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    /// The winning seat.
    #[serde(rename = "seatIndex")]
    pub seat: SeatIndex,
    /// The winning hand category, none when every other seat folded.
    pub ranking: Option<HandRank>,
    /// The chips won across all pots.
    #[serde(rename = "winnings")]
    pub amount: Chips,
}

/// The table engine.
#[derive(Debug)]
pub struct TableEngine {
    seats: Seats,
    forced_bets: ForcedBets,
    phase: HandPhase,
    button: Option<SeatIndex>,
    small_blind: Option<SeatIndex>,
    big_blind: Option<SeatIndex>,
    deck: Deck,
    community_cards: Vec<Card>,
    pots: Vec<Pot>,
    to_act: Option<SeatIndex>,
    legal_actions: Option<LegalActions>,
    round_max: Chips,
    min_raise: Chips,
    winners: Vec<Winner>,
    table_chips: Chips,
    rng: StdRng,
}

/// A seat needs to act if it is in the hand with chips behind and it either
/// has not acted yet or has not matched the largest bet.
fn needs_action(seat: &Seat, round_max: Chips) -> bool {
    seat.is_contending() && !seat.all_in && (!seat.acted || seat.bet < round_max)
}

impl TableEngine {
    /// Creates an engine with the given number of seats.
    pub fn new(num_seats: usize, forced_bets: ForcedBets) -> Self {
        Self::with_rng(num_seats, forced_bets, StdRng::from_os_rng())
    }

    /// Creates an engine with user initialized randomness.
    pub fn with_rng(num_seats: usize, forced_bets: ForcedBets, rng: StdRng) -> Self {
        Self {
            seats: Seats::new(num_seats),
            forced_bets,
            phase: HandPhase::Prehand,
            button: None,
            small_blind: None,
            big_blind: None,
            deck: Deck::default(),
            community_cards: Vec::with_capacity(5),
            pots: Vec::new(),
            to_act: None,
            legal_actions: None,
            round_max: Chips::ZERO,
            min_raise: forced_bets.big_blind,
            winners: Vec::new(),
            table_chips: Chips::ZERO,
            rng,
        }
    }

    /// Creates an engine with a seeded random generator.
    pub fn with_seed(num_seats: usize, forced_bets: ForcedBets, seed: u64) -> Self {
        Self::with_rng(num_seats, forced_bets, StdRng::seed_from_u64(seed))
    }

    /// Sits a buy in at an empty seat.
    pub fn sit_down(&mut self, seat: SeatIndex, buy_in: Chips) -> Result<(), EngineError> {
        if seat >= self.seats.capacity() {
            return Err(EngineError::seat(seat, "seat index out of range"));
        }

        if self.seats.is_occupied(seat) {
            return Err(EngineError::seat(seat, "seat is occupied"));
        }

        if buy_in.is_zero() {
            return Err(EngineError::seat(seat, "buy in must be positive"));
        }

        if self.is_hand_in_progress() {
            return Err(EngineError::seat(seat, "hand in progress"));
        }

        let Some(table_chips) = self.table_chips.checked_add(buy_in) else {
            return Err(EngineError::seat(seat, "buy in overflows table chips"));
        };

        self.seats.insert(seat, buy_in);
        self.table_chips = table_chips;

        debug!("Seat {seat} sit down with {buy_in} chips");
        self.debug_check_chips();
        Ok(())
    }

    /// Removes a seat from the table, returns its remaining stack.
    ///
    /// A seat dealt in the current hand cannot stand up until the hand ends.
    pub fn stand_up(&mut self, seat: SeatIndex) -> Result<Chips, EngineError> {
        let Some(s) = self.seats.get(seat) else {
            return Err(EngineError::seat(seat, "seat is empty"));
        };

        if self.is_hand_in_progress() && s.is_in_hand() {
            return Err(EngineError::seat(seat, "seat is in the hand"));
        }

        let stack = self.seats.remove(seat).map(|s| s.stack).unwrap_or_default();
        self.table_chips -= stack;

        debug!("Seat {seat} stand up with {stack} chips");
        self.debug_check_chips();
        Ok(stack)
    }

    /// Changes the forced bets for the next hands.
    pub fn set_forced_bets(&mut self, forced_bets: ForcedBets) -> Result<(), EngineError> {
        if self.is_hand_in_progress() {
            return Err(EngineError::InvalidState("hand in progress"));
        }

        self.forced_bets = forced_bets;
        Ok(())
    }

    /// Starts a hand with a shuffled deck.
    ///
    /// The button moves clockwise to the next seat with chips, a button
    /// override is used only if it names a seat with chips.
    pub fn start_hand(&mut self, button: Option<SeatIndex>) -> Result<(), EngineError> {
        let deck = Deck::new_and_shuffled(&mut self.rng);
        self.start_hand_with_deck(button, deck)
    }

    /// Starts a hand dealing cards from the given deck.
    pub fn start_hand_with_deck(
        &mut self,
        button: Option<SeatIndex>,
        deck: Deck,
    ) -> Result<(), EngineError> {
        if self.is_hand_in_progress() {
            return Err(EngineError::InvalidState("hand in progress"));
        }

        let dealt = self.seats.iter().filter(|s| !s.stack.is_zero()).count();
        if dealt < 2 {
            return Err(EngineError::InsufficientPlayers(dealt));
        }

        let button = self
            .next_button(button)
            .ok_or(EngineError::InsufficientPlayers(dealt))?;

        for seat in self.seats.iter_mut() {
            seat.start_hand();
        }

        let (small_blind, big_blind) = if dealt == 2 {
            // Heads up the button posts the small blind.
            (Some(button), self.seats.next_after(button, Seat::is_in_hand))
        } else {
            let small_blind = self.seats.next_after(button, Seat::is_in_hand);
            let big_blind =
                small_blind.and_then(|sb| self.seats.next_after(sb, Seat::is_in_hand));
            (small_blind, big_blind)
        };

        let (Some(sb), Some(bb)) = (small_blind, big_blind) else {
            return Err(EngineError::InsufficientPlayers(dealt));
        };

        self.phase = HandPhase::Preflop;
        self.button = Some(button);
        self.small_blind = Some(sb);
        self.big_blind = Some(bb);
        self.deck = deck;
        self.community_cards.clear();
        self.winners.clear();

        let ForcedBets {
            ante,
            big_blind,
            small_blind,
        } = self.forced_bets;

        if !ante.is_zero() {
            for seat in self.seats.iter_mut().filter(|s| s.is_in_hand()) {
                seat.put_ante(ante);
            }
        }

        if let Some(seat) = self.seats.get_mut(sb) {
            seat.put(small_blind);
        }

        if let Some(seat) = self.seats.get_mut(bb) {
            seat.put(big_blind);
        }

        self.round_max = self.seats.iter().map(Seat::bet).max().unwrap_or_default();
        self.min_raise = big_blind;
        self.pots = self.collect_pots();

        // Deal one card at a time starting left of the button.
        let order = self
            .seats
            .clockwise_after(button)
            .filter(|s| s.is_in_hand())
            .map(Seat::index)
            .collect::<Vec<_>>();
        let first = order.iter().map(|_| self.deck.deal()).collect::<Vec<_>>();
        for (&idx, c1) in order.iter().zip(first) {
            let c2 = self.deck.deal();
            if let Some(seat) = self.seats.get_mut(idx) {
                seat.hole_cards = Some([c1, c2]);
            }
        }

        debug!(
            "Start hand button {button} small blind {sb} big blind {bb} with {dealt} seats"
        );

        self.start_round(bb);
        self.debug_check_chips();
        Ok(())
    }

    /// Applies an action for the seat to act.
    ///
    /// Bet and raise amounts are the seat total bet for the round, the amount
    /// is ignored for other actions.
    pub fn action_taken(&mut self, action: Action, amount: Chips) -> Result<(), EngineError> {
        let Some(idx) = self.to_act else {
            return Err(EngineError::InvalidState("no betting round in progress"));
        };

        let amount = match &self.legal_actions {
            Some(legal) => legal.validate(action, amount)?,
            None => return Err(EngineError::InvalidState("no legal actions")),
        };

        let round_max = self.round_max;
        let Some(seat) = self.seats.get_mut(idx) else {
            return Err(EngineError::InvalidState("seat to act is empty"));
        };

        match action {
            Action::Fold => seat.folded = true,
            Action::Check => {}
            Action::Call => {
                let shortfall = round_max - seat.bet;
                seat.put(shortfall);
            }
            Action::Bet | Action::Raise => {
                let increment = amount - seat.bet;
                seat.put(increment);
            }
        }

        seat.acted = true;
        let bet = seat.bet;

        if bet > round_max {
            // Full raises set the minimum raise, everybody else acts again.
            self.min_raise = self.min_raise.max(bet - round_max);
            self.round_max = bet;
            for other in self.seats.iter_mut().filter(|s| s.index() != idx) {
                other.acted = false;
            }
        }

        debug!("Seat {idx} {action} bet {bet}");

        self.to_act = if self.is_round_complete() {
            None
        } else {
            self.seats
                .next_after(idx, |s| needs_action(s, self.round_max))
        };
        self.update_legal_actions();
        self.debug_check_chips();
        Ok(())
    }

    /// Ends a completed betting round.
    ///
    /// Collects the bets into the pots and deals the next street, or awards
    /// the pots if one seat is left in the hand.
    pub fn end_betting_round(&mut self) -> Result<(), EngineError> {
        if !self.phase.is_betting() {
            return Err(EngineError::InvalidState("no betting round to end"));
        }

        if self.to_act.is_some() {
            return Err(EngineError::InvalidState("betting round in progress"));
        }

        self.return_uncalled_bet();

        for seat in self.seats.iter_mut() {
            seat.bet = Chips::ZERO;
            seat.acted = false;
        }

        self.pots = self.collect_pots();
        self.round_max = Chips::ZERO;
        self.min_raise = self.forced_bets.big_blind;

        let contending = self.seats.iter().filter(|s| s.is_contending()).count();
        if contending < 2 {
            self.award_uncontested();
            self.end_hand();
        } else {
            let cards = match self.phase {
                HandPhase::Preflop => 3,
                HandPhase::Flop | HandPhase::Turn => 1,
                _ => 0,
            };

            for _ in 0..cards {
                self.community_cards.push(self.deck.deal());
            }

            self.phase = match self.phase {
                HandPhase::Preflop => HandPhase::Flop,
                HandPhase::Flop => HandPhase::Turn,
                HandPhase::Turn => HandPhase::River,
                _ => HandPhase::Showdown,
            };

            if self.phase.is_betting() {
                if let Some(button) = self.button {
                    self.start_round(button);
                }
            }
        }

        debug!("End betting round, phase {}", self.phase);
        self.debug_check_chips();
        Ok(())
    }

    /// Evaluates the hands in showdown and awards the pots.
    pub fn showdown(&mut self) -> Result<(), EngineError> {
        if self.phase != HandPhase::Showdown {
            return Err(EngineError::InvalidState("betting rounds not completed"));
        }

        let mut values = Vec::new();
        for seat in self.seats.iter_mut().filter(|s| s.is_contending()) {
            seat.revealed = true;
            if let Some([c1, c2]) = seat.hole_cards {
                let mut cards = vec![c1, c2];
                cards.extend_from_slice(&self.community_cards);
                values.push((seat.index(), HandValue::eval(&cards)));
            }
        }

        let button = self.button.unwrap_or_default();
        let capacity = self.seats.capacity();
        let mut winners = BTreeMap::<SeatIndex, Winner>::new();

        for pot in std::mem::take(&mut self.pots) {
            let eligible = values
                .iter()
                .filter(|(seat, _)| pot.eligible.contains(seat))
                .collect::<Vec<_>>();

            let Some(best) = eligible.iter().map(|(_, value)| *value).max() else {
                continue;
            };

            let mut pot_winners = eligible
                .iter()
                .filter(|(_, value)| *value == best)
                .map(|(seat, _)| *seat)
                .collect::<Vec<_>>();

            // Odd chips go to the first winner left of the button.
            pot_winners.sort_by_key(|&seat| (seat + capacity - button - 1) % capacity);

            let n = pot_winners.len() as u32;
            let share = pot.size / n;
            let odd = pot.size % n;

            for (pos, seat_idx) in pot_winners.into_iter().enumerate() {
                let amount = if pos == 0 { share + odd } else { share };

                if let Some(seat) = self.seats.get_mut(seat_idx) {
                    seat.stack += amount;
                }

                winners
                    .entry(seat_idx)
                    .or_insert_with(|| Winner {
                        seat: seat_idx,
                        ranking: Some(best.rank()),
                        amount: Chips::ZERO,
                    })
                    .amount += amount;
            }
        }

        self.winners = winners.into_values().collect();
        self.end_hand();

        debug!("Showdown winners {:?}", self.winners);
        self.debug_check_chips();
        Ok(())
    }

    /// Clears the last hand cards and winners.
    pub fn clear_hand(&mut self) -> Result<(), EngineError> {
        if self.is_hand_in_progress() {
            return Err(EngineError::InvalidState("hand in progress"));
        }

        for seat in self.seats.iter_mut() {
            seat.start_hand();
            seat.in_hand = false;
        }

        self.community_cards.clear();
        self.winners.clear();
        self.phase = HandPhase::Prehand;
        Ok(())
    }

    /// The current hand phase.
    pub fn phase(&self) -> HandPhase {
        self.phase
    }

    /// Checks if a hand is being played.
    pub fn is_hand_in_progress(&self) -> bool {
        self.phase.is_betting() || self.phase == HandPhase::Showdown
    }

    /// Checks if a seat has to act in the current betting round.
    pub fn is_betting_round_in_progress(&self) -> bool {
        self.to_act.is_some()
    }

    /// Checks if all betting rounds are completed and the hand needs a showdown.
    pub fn are_betting_rounds_completed(&self) -> bool {
        self.phase == HandPhase::Showdown
    }

    /// The seat to act.
    pub fn player_to_act(&self) -> Option<SeatIndex> {
        self.to_act
    }

    /// The legal actions for the seat to act.
    pub fn legal_actions(&self) -> Option<&LegalActions> {
        self.legal_actions.as_ref()
    }

    /// The button seat.
    pub fn button(&self) -> Option<SeatIndex> {
        self.button
    }

    /// The small blind seat of the current or last hand.
    pub fn small_blind_seat(&self) -> Option<SeatIndex> {
        self.small_blind
    }

    /// The big blind seat of the current or last hand.
    pub fn big_blind_seat(&self) -> Option<SeatIndex> {
        self.big_blind
    }

    /// The table seats.
    pub fn seats(&self) -> &Seats {
        &self.seats
    }

    /// An occupied seat.
    pub fn seat(&self, seat: SeatIndex) -> Option<&Seat> {
        self.seats.get(seat)
    }

    /// The number of seats.
    pub fn num_seats(&self) -> usize {
        self.seats.capacity()
    }

    /// The number of occupied seats.
    pub fn occupied_seats(&self) -> usize {
        self.seats.count()
    }

    /// The empty seat indices.
    pub fn empty_seats(&self) -> Vec<SeatIndex> {
        self.seats.empty().collect()
    }

    /// The forced bets.
    pub fn forced_bets(&self) -> ForcedBets {
        self.forced_bets
    }

    /// The pots collected from the previous betting rounds.
    pub fn pots(&self) -> &[Pot] {
        &self.pots
    }

    /// The community cards.
    pub fn community_cards(&self) -> &[Card] {
        &self.community_cards
    }

    /// The hole cards of a seat.
    pub fn hole_cards(&self, seat: SeatIndex) -> Option<[Card; 2]> {
        self.seats.get(seat).and_then(Seat::hole_cards)
    }

    /// The winners of the last hand.
    pub fn winners(&self) -> &[Winner] {
        &self.winners
    }

    /// The largest bet in the current betting round.
    pub fn current_bet(&self) -> Chips {
        self.round_max
    }

    /// The chips on the table in stacks, bets and pots.
    pub fn total_chips(&self) -> Chips {
        let seats = self.seats.iter().map(Seat::total_chips).sum::<Chips>();
        let pots = self.pots.iter().map(|p| p.size).sum::<Chips>();
        seats + pots
    }

    /// Checks that no chips have been created or destroyed.
    pub fn chips_balanced(&self) -> bool {
        self.total_chips() == self.table_chips
    }

    /// Returns an error if chips have been created or destroyed.
    pub fn check_chips(&self) -> Result<(), EngineError> {
        if self.chips_balanced() {
            Ok(())
        } else {
            Err(EngineError::ChipAccounting {
                expected: self.table_chips,
                found: self.total_chips(),
            })
        }
    }

    fn debug_check_chips(&self) {
        debug_assert!(
            self.chips_balanced(),
            "chips not balanced: expected {} found {}",
            self.table_chips,
            self.total_chips()
        );
    }

    fn next_button(&self, button: Option<SeatIndex>) -> Option<SeatIndex> {
        let has_chips = |s: &Seat| !s.stack.is_zero();
        let lowest = self.seats.iter().find(|s| has_chips(s)).map(Seat::index);

        match (button, self.button) {
            (Some(idx), _) if self.seats.get(idx).is_some_and(has_chips) => Some(idx),
            (Some(_), _) | (None, None) => lowest,
            (None, Some(prev)) => self.seats.next_after(prev, has_chips),
        }
    }

    /// Starts a betting round with the first seat to act after `from`.
    fn start_round(&mut self, from: SeatIndex) {
        self.to_act = if self.is_round_complete() {
            None
        } else {
            self.seats
                .next_after(from, |s| needs_action(s, self.round_max))
        };
        self.update_legal_actions();
    }

    fn is_round_complete(&self) -> bool {
        let contending = self.seats.iter().filter(|s| s.is_contending()).count();
        if contending < 2 {
            return true;
        }

        let mut can_act = self.seats.iter().filter(|s| s.is_contending() && !s.all_in);
        match (can_act.next(), can_act.next()) {
            (None, _) => true,
            // Nobody left to bet against.
            (Some(seat), None) if seat.bet >= self.round_max => true,
            _ => !self.seats.iter().any(|s| needs_action(s, self.round_max)),
        }
    }

    fn update_legal_actions(&mut self) {
        self.legal_actions = self.to_act.and_then(|idx| self.seats.get(idx)).map(|s| {
            LegalActions::derive(
                s.stack,
                s.bet,
                self.round_max,
                self.min_raise,
                self.forced_bets.big_blind,
            )
        });
    }

    /// Returns the part of the largest bet nobody matched.
    fn return_uncalled_bet(&mut self) {
        let mut bets = self
            .seats
            .iter()
            .filter(|s| !s.bet.is_zero())
            .map(|s| (s.bet, s.index()))
            .collect::<Vec<_>>();
        bets.sort_unstable_by(|a, b| b.cmp(a));

        let (top, second) = match bets.as_slice() {
            [] => return,
            [top] => (*top, Chips::ZERO),
            [top, second, ..] => (*top, second.0),
        };

        if top.0 > second {
            if let Some(seat) = self.seats.get_mut(top.1) {
                seat.take_back(top.0 - second);
                debug!("Seat {} uncalled bet {} returned", top.1, top.0 - second);
            }
        }
    }

    /// Builds the pots from the chips committed in previous rounds.
    fn collect_pots(&self) -> Vec<Pot> {
        let contributions = self
            .seats
            .iter()
            .filter(|s| s.is_in_hand())
            .map(|s| Contribution {
                seat: s.index(),
                amount: s.committed - s.bet,
                folded: s.folded,
                all_in: s.all_in,
            })
            .collect::<Vec<_>>();

        build_pots(&contributions)
    }

    fn award_uncontested(&mut self) {
        let total = self.pots.drain(..).map(|p| p.size).sum::<Chips>();
        if let Some(seat) = self.seats.iter_mut().find(|s| s.is_contending()) {
            seat.stack += total;
            self.winners = vec![Winner {
                seat: seat.index(),
                ranking: None,
                amount: total,
            }];
        }
    }

    fn end_hand(&mut self) {
        for seat in self.seats.iter_mut() {
            seat.end_hand();
        }

        self.pots.clear();
        self.to_act = None;
        self.legal_actions = None;
        self.round_max = Chips::ZERO;
        self.phase = HandPhase::Posthand;
    }
}
