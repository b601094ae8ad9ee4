// Copyright (C) 2025 Pokerhost Developers
// SPDX-License-Identifier: Apache-2.0

//! Public and per seat views of the table state.
//!
//! Views are derived from the engine and never expose the hole cards of a
//! seat to anybody else until they are revealed at showdown.
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::{
    engine::{HandPhase, LegalActions, Pot, Seat, TableEngine, Winner},
    poker::{Card, Chips, ForcedBets, SeatIndex},
};

/// The identity of a seat occupant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occupant {
    /// The occupant unique id.
    pub id: String,
    /// The display name.
    pub name: String,
}

/// A seat in the public view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSeat {
    /// The seat index.
    pub seat_index: SeatIndex,
    /// The occupant name.
    pub name: String,
    /// The chips behind.
    pub stack: Chips,
    /// The bet in the current round.
    pub bet: Chips,
    /// The seat folded.
    pub is_folded: bool,
    /// The seat is all in.
    pub is_all_in: bool,
    /// The hole cards if revealed.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub hole_cards: Option<[Card; 2]>,
}

/// The table view every seat can see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicView {
    /// The forced bets.
    pub forced_bets: ForcedBets,
    /// The number of seats.
    pub num_seats: usize,
    /// The empty seats.
    pub empty_seats: Vec<SeatIndex>,
    /// The button seat.
    pub button: Option<SeatIndex>,
    /// The small blind seat.
    pub small_blind_seat: Option<SeatIndex>,
    /// The big blind seat.
    pub big_blind_seat: Option<SeatIndex>,
    /// The name of the seat to act.
    pub player_to_act_name: Option<String>,
    /// The seat to act.
    pub player_to_act_seat: Option<SeatIndex>,
    /// The pots.
    pub pots: Vec<Pot>,
    /// The community cards.
    pub community_cards: Vec<Card>,
    /// The hand phase.
    pub game_state: HandPhase,
    /// The last hand winners.
    pub winners: Vec<Winner>,
    /// The occupied seats.
    pub seats: Vec<PublicSeat>,
}

/// The table view of a single seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateView {
    /// The occupant id.
    pub public_key: String,
    /// The occupant name.
    pub name: String,
    /// The seat index.
    pub seat: SeatIndex,
    /// The seat hole cards.
    pub hole_cards: Option<[Card; 2]>,
    /// The seat has the button.
    pub is_dealer: bool,
    /// The seat posted the small blind.
    pub is_small_blind: bool,
    /// The seat posted the big blind.
    pub is_big_blind: bool,
    /// It is this seat turn to act.
    pub to_action: bool,
    /// The legal actions, only on this seat turn.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub legal_actions: Option<LegalActions>,
    /// The chips behind.
    pub stack: Chips,
    /// The bet in the current round.
    pub current_bet: Chips,
    /// The seat folded.
    pub is_folded: bool,
    /// The seat won chips in the last hand.
    pub is_winner: bool,
}

/// A player entry in the table snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPlayer {
    /// The occupant id.
    pub id: String,
    /// The occupant name.
    pub name: String,
    /// The chips behind.
    pub money: Chips,
    /// The hole cards if revealed.
    pub cards: Option<[Card; 2]>,
    /// The seat folded.
    pub is_folded: bool,
    /// The seat has the button.
    pub is_dealer: bool,
    /// The seat won chips in the last hand.
    pub is_winner: bool,
}

/// The table state served to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// The chips in the pots.
    pub pot_size: Chips,
    /// The community cards.
    pub community_cards: Vec<Card>,
    /// The seated players.
    pub players: Vec<SnapshotPlayer>,
    /// The name of the player to act.
    pub action_on: Option<String>,
    /// The hand phase.
    pub game_state: HandPhase,
    /// The full public view.
    pub table_state: PublicView,
}

/// Derives views from the engine state and the seat occupants.
pub struct StateProjector<'a> {
    engine: &'a TableEngine,
    occupants: &'a AHashMap<SeatIndex, Occupant>,
}

impl<'a> StateProjector<'a> {
    /// Creates a projector.
    pub fn new(engine: &'a TableEngine, occupants: &'a AHashMap<SeatIndex, Occupant>) -> Self {
        Self { engine, occupants }
    }

    fn name(&self, seat: SeatIndex) -> String {
        self.occupants
            .get(&seat)
            .map(|o| o.name.clone())
            .unwrap_or_default()
    }

    fn is_winner(&self, seat: SeatIndex) -> bool {
        self.engine.winners().iter().any(|w| w.seat == seat)
    }

    fn revealed_cards(seat: &Seat) -> Option<[Card; 2]> {
        seat.is_revealed().then(|| seat.hole_cards()).flatten()
    }

    /// The public view.
    pub fn public_view(&self) -> PublicView {
        let engine = self.engine;
        let to_act = engine.player_to_act();

        let seats = engine
            .seats()
            .iter()
            .map(|seat| PublicSeat {
                seat_index: seat.index(),
                name: self.name(seat.index()),
                stack: seat.stack(),
                bet: seat.bet(),
                is_folded: seat.is_folded(),
                is_all_in: seat.is_all_in(),
                hole_cards: Self::revealed_cards(seat),
            })
            .collect();

        PublicView {
            forced_bets: engine.forced_bets(),
            num_seats: engine.num_seats(),
            empty_seats: engine.empty_seats(),
            button: engine.button(),
            small_blind_seat: engine.small_blind_seat(),
            big_blind_seat: engine.big_blind_seat(),
            player_to_act_name: to_act.map(|seat| self.name(seat)),
            player_to_act_seat: to_act,
            pots: engine.pots().to_vec(),
            community_cards: engine.community_cards().to_vec(),
            game_state: engine.phase(),
            winners: engine.winners().to_vec(),
            seats,
        }
    }

    /// The view of an occupied seat.
    pub fn private_view(&self, seat: SeatIndex) -> Option<PrivateView> {
        let engine = self.engine;
        let state = engine.seat(seat)?;
        let occupant = self.occupants.get(&seat);
        let to_action = engine.player_to_act() == Some(seat);

        Some(PrivateView {
            public_key: occupant.map(|o| o.id.clone()).unwrap_or_default(),
            name: occupant.map(|o| o.name.clone()).unwrap_or_default(),
            seat,
            hole_cards: state.hole_cards(),
            is_dealer: engine.button() == Some(seat),
            is_small_blind: engine.small_blind_seat() == Some(seat),
            is_big_blind: engine.big_blind_seat() == Some(seat),
            to_action,
            legal_actions: to_action.then(|| engine.legal_actions().cloned()).flatten(),
            stack: state.stack(),
            current_bet: state.bet(),
            is_folded: state.is_folded(),
            is_winner: self.is_winner(seat),
        })
    }

    /// The observers snapshot.
    pub fn snapshot(&self) -> GameSnapshot {
        let engine = self.engine;
        let players = engine
            .seats()
            .iter()
            .map(|seat| {
                let idx = seat.index();
                SnapshotPlayer {
                    id: self
                        .occupants
                        .get(&idx)
                        .map(|o| o.id.clone())
                        .unwrap_or_default(),
                    name: self.name(idx),
                    money: seat.stack(),
                    cards: Self::revealed_cards(seat),
                    is_folded: seat.is_folded(),
                    is_dealer: engine.button() == Some(idx),
                    is_winner: self.is_winner(idx),
                }
            })
            .collect();

        GameSnapshot {
            pot_size: engine.pots().iter().map(|p| p.size).sum(),
            community_cards: engine.community_cards().to_vec(),
            players,
            action_on: engine.player_to_act().map(|seat| self.name(seat)),
            game_state: engine.phase(),
            table_state: self.public_view(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{engine::Action, poker::Deck};

    fn occupants(n: usize) -> AHashMap<SeatIndex, Occupant> {
        (0..n)
            .map(|seat| {
                let occupant = Occupant {
                    id: format!("id-{seat}"),
                    name: format!("player{seat}"),
                };
                (seat, occupant)
            })
            .collect()
    }

    fn cards(s: &str) -> Vec<Card> {
        s.split_whitespace().map(|c| c.parse().unwrap()).collect()
    }

    fn new_engine() -> TableEngine {
        let mut engine = TableEngine::with_seed(4, ForcedBets::blinds(50, 100), 7);
        for seat in 0..3 {
            engine.sit_down(seat, Chips::new(2000)).unwrap();
        }
        engine
    }

    #[test]
    fn public_view_hides_hole_cards() {
        let mut engine = new_engine();
        engine.start_hand(None).unwrap();

        let occupants = occupants(3);
        let projector = StateProjector::new(&engine, &occupants);
        let view = projector.public_view();

        assert_eq!(view.num_seats, 4);
        assert_eq!(view.empty_seats, vec![3]);
        assert_eq!(view.button, Some(0));
        assert_eq!(view.small_blind_seat, Some(1));
        assert_eq!(view.big_blind_seat, Some(2));
        assert_eq!(view.player_to_act_seat, Some(0));
        assert_eq!(view.player_to_act_name.as_deref(), Some("player0"));
        assert_eq!(view.game_state, HandPhase::Preflop);
        assert!(view.seats.iter().all(|s| s.hole_cards.is_none()));
        assert_eq!(view.seats[1].bet, Chips::new(50));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["gameState"], "preflop");
        assert_eq!(json["forcedBets"]["bigBlind"], 100);
        assert!(json["seats"][0].get("holeCards").is_none());
    }

    #[test]
    fn private_view_legal_actions_on_turn() {
        let mut engine = new_engine();
        engine.start_hand(None).unwrap();

        let occupants = occupants(3);
        let projector = StateProjector::new(&engine, &occupants);

        let view = projector.private_view(0).unwrap();
        assert_eq!(view.public_key, "id-0");
        assert!(view.to_action);
        assert!(view.is_dealer);
        assert_eq!(view.hole_cards, engine.hole_cards(0));
        let legal = view.legal_actions.unwrap();
        assert_eq!(legal.actions, vec![Action::Fold, Action::Call, Action::Raise]);

        let view = projector.private_view(2).unwrap();
        assert!(!view.to_action);
        assert!(view.is_big_blind);
        assert_eq!(view.current_bet, Chips::new(100));
        assert_eq!(view.stack, Chips::new(1900));
        assert!(view.legal_actions.is_none());

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("legalActions").is_none());
        assert_eq!(json["toAction"], false);

        assert!(projector.private_view(3).is_none());
    }

    #[test]
    fn showdown_reveals_contenders() {
        let mut engine = new_engine();
        let deck = Deck::stacked(&cards("KH QH AH KD QD AD 2C 7S 9D 3C 8S"));
        engine.start_hand_with_deck(None, deck).unwrap();

        // Seat 0 folds, seats 1 and 2 check down.
        engine.action_taken(Action::Fold, Chips::ZERO).unwrap();
        engine.action_taken(Action::Call, Chips::ZERO).unwrap();
        engine.action_taken(Action::Check, Chips::ZERO).unwrap();
        while !engine.are_betting_rounds_completed() {
            while engine.is_betting_round_in_progress() {
                engine.action_taken(Action::Check, Chips::ZERO).unwrap();
            }
            engine.end_betting_round().unwrap();
        }
        engine.showdown().unwrap();

        let occupants = occupants(3);
        let projector = StateProjector::new(&engine, &occupants);
        let snapshot = projector.snapshot();

        assert_eq!(snapshot.game_state, HandPhase::Posthand);
        assert_eq!(snapshot.community_cards.len(), 5);
        assert_eq!(snapshot.action_on, None);

        let players = &snapshot.players;
        assert_eq!(players[0].cards, None);
        assert!(players[0].is_folded);
        assert!(players[0].is_dealer);
        assert_eq!(players[1].cards, Some([cards("KH")[0], cards("KD")[0]]));
        assert!(players[1].is_winner);
        assert_eq!(players[1].money, Chips::new(2100));
        assert!(players[2].cards.is_some());
        assert!(!players[2].is_winner);

        let winners = &snapshot.table_state.winners;
        assert_eq!(winners.len(), 1);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["gameState"], "posthand");
        assert_eq!(json["tableState"]["winners"][0]["seatIndex"], 1);
        assert_eq!(json["tableState"]["winners"][0]["ranking"], "Pair");
        assert_eq!(json["tableState"]["winners"][0]["winnings"], 200);
    }
}
