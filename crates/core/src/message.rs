// Copyright (C) 2025 Pokerhost Developers
// SPDX-License-Identifier: Apache-2.0

//! Decision protocol messages exchanged with remote players.
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{
    engine::{Action, ChipRange, HandPhase, LegalActions},
    error::EngineError,
    poker::{Chips, SeatIndex},
    view::{PrivateView, PublicView},
};

/// An action taken in the current hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionHistoryEntry {
    /// The betting round.
    pub round: HandPhase,
    /// The seat that acted.
    pub seat: SeatIndex,
    /// The seat occupant name.
    pub name: String,
    /// The action.
    pub action: Action,
    /// The bet or raise amount, zero for other actions.
    pub amount: Chips,
}

/// The actions taken in the current hand, cleared at the hand start.
#[derive(Debug, Clone, Default)]
pub struct ActionHistory {
    entries: Vec<ActionHistoryEntry>,
}

impl ActionHistory {
    /// Appends an entry.
    pub fn push(&mut self, entry: ActionHistoryEntry) {
        self.entries.push(entry);
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over the entries.
    pub fn iter(&self) -> impl Iterator<Item = &ActionHistoryEntry> {
        self.entries.iter()
    }

    /// Encodes the history with the given shape.
    pub fn payload(&self, shape: HistoryShape) -> HistoryPayload {
        match shape {
            HistoryShape::Detailed => HistoryPayload::Detailed(
                self.iter()
                    .map(|e| DetailedEntry {
                        round_of_betting: e.round,
                        name: e.name.clone(),
                        action: e.action,
                        bet_size: e.amount,
                    })
                    .collect(),
            ),
            HistoryShape::Compact => HistoryPayload::Compact(
                self.iter()
                    .map(|e| CompactEntry(e.round, e.seat, e.action, e.amount))
                    .collect(),
            ),
        }
    }
}

/// How the action history is encoded in a decision request.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum HistoryShape {
    /// One object per action with the actor name.
    #[default]
    Detailed,
    /// One tuple per action with the actor seat.
    Compact,
}

impl FromStr for HistoryShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "detailed" => Ok(HistoryShape::Detailed),
            "compact" => Ok(HistoryShape::Compact),
            _ => Err(format!("invalid history shape {s}, use detailed or compact")),
        }
    }
}

/// A detailed history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedEntry {
    /// The betting round.
    pub round_of_betting: HandPhase,
    /// The actor name.
    pub name: String,
    /// The action.
    pub action: Action,
    /// The bet size.
    pub bet_size: Chips,
}

/// A compact history entry with round, seat, action and bet size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactEntry(pub HandPhase, pub SeatIndex, pub Action, pub Chips);

/// The encoded action history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryPayload {
    /// Detailed entries.
    Detailed(Vec<DetailedEntry>),
    /// Compact entries.
    Compact(Vec<CompactEntry>),
}

/// A request for a decision sent to the seat to act.
///
/// Non-acting seats receive the same payload as a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    /// The public table view.
    pub table_state: PublicView,
    /// The private view of the receiving seat.
    pub player_state: PrivateView,
    /// The actions taken in this hand.
    pub action_history: HistoryPayload,
}

/// A message posted to a remote player endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum Envelope {
    /// Asks the seat to act, a [DecisionResponse] is expected.
    Query(DecisionRequest),
    /// A state update, the response body is ignored.
    Update(DecisionRequest),
}

/// A decision returned by a remote player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResponse {
    /// The action label.
    pub action: String,
    /// The total bet for a bet or a raise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bet_size: Option<f64>,
}

impl DecisionResponse {
    /// Creates a response.
    pub fn new(action: Action, bet_size: Option<Chips>) -> Self {
        Self {
            action: action.label().to_string(),
            bet_size: bet_size.map(|c| c.amount() as f64),
        }
    }

    /// Validates this response against the legal actions.
    ///
    /// The bet size is only checked for bet and raise, it must be a whole
    /// number of chips in the legal range.
    pub fn validate(&self, legal: &LegalActions) -> Result<(Action, Chips), EngineError> {
        let action = self
            .action
            .parse::<Action>()
            .map_err(|_| EngineError::UnknownAction(self.action.clone()))?;

        if !action.is_sized() {
            return legal.validate(action, Chips::ZERO).map(|amount| (action, amount));
        }

        let size = self.bet_size.unwrap_or_default();
        // Casting saturates, negative and NaN sizes end up as zero.
        let amount = Chips::new(size as u32);
        if !size.is_finite() || size.fract() != 0.0 || size > u32::MAX as f64 {
            let range = legal.chip_range.unwrap_or(ChipRange {
                min: Chips::ZERO,
                max: Chips::ZERO,
            });
            return Err(EngineError::IllegalBetSize {
                amount,
                min: range.min,
                max: range.max,
            });
        }

        legal.validate(action, amount).map(|amount| (action, amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legal() -> LegalActions {
        LegalActions::derive(
            Chips::new(2000),
            Chips::ZERO,
            Chips::new(100),
            Chips::new(100),
            Chips::new(100),
        )
    }

    fn response(json: &str) -> DecisionResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn valid_responses() {
        let legal = legal();

        let res = response(r#"{"action":"call","betSize":0}"#);
        assert_eq!(res.validate(&legal), Ok((Action::Call, Chips::ZERO)));

        // Size ignored for unsized actions.
        let res = response(r#"{"action":"fold","betSize":12.5}"#);
        assert_eq!(res.validate(&legal), Ok((Action::Fold, Chips::ZERO)));

        let res = response(r#"{"action":"raise","betSize":450}"#);
        assert_eq!(res.validate(&legal), Ok((Action::Raise, Chips::new(450))));

        let res = response(r#"{"action":"call"}"#);
        assert_eq!(res.bet_size, None);
        assert!(res.validate(&legal).is_ok());
    }

    #[test]
    fn invalid_responses() {
        let legal = legal();

        let res = response(r#"{"action":"check","betSize":0}"#);
        assert_eq!(
            res.validate(&legal),
            Err(EngineError::IllegalAction(Action::Check))
        );

        let res = response(r#"{"action":"shove","betSize":2000}"#);
        assert_eq!(
            res.validate(&legal),
            Err(EngineError::UnknownAction("shove".to_string()))
        );

        for size in ["150", "2500", "200.5", "-300"] {
            let res = response(&format!(r#"{{"action":"raise","betSize":{size}}}"#));
            assert!(
                matches!(res.validate(&legal), Err(EngineError::IllegalBetSize { .. })),
                "size {size}"
            );
        }

        let res = response(r#"{"action":"raise"}"#);
        assert!(matches!(
            res.validate(&legal),
            Err(EngineError::IllegalBetSize { .. })
        ));
    }

    #[test]
    fn response_json() {
        let res = DecisionResponse::new(Action::Raise, Some(Chips::new(300)));
        let json = serde_json::to_string(&res).unwrap();
        assert_eq!(json, r#"{"action":"raise","betSize":300.0}"#);
    }

    #[test]
    fn envelope_json() {
        use crate::{
            TableEngine,
            poker::ForcedBets,
            view::{Occupant, StateProjector},
        };

        let mut engine = TableEngine::with_seed(2, ForcedBets::blinds(5, 10), 3);
        engine.sit_down(0, Chips::new(300)).unwrap();
        engine.sit_down(1, Chips::new(300)).unwrap();
        engine.start_hand(None).unwrap();

        let occupants: ahash::AHashMap<_, _> = (0..2)
            .map(|seat| {
                let occupant = Occupant {
                    id: format!("key{seat}"),
                    name: format!("name{seat}"),
                };
                (seat, occupant)
            })
            .collect();
        let projector = StateProjector::new(&engine, &occupants);
        let request = DecisionRequest {
            table_state: projector.public_view(),
            player_state: projector.private_view(0).unwrap(),
            action_history: ActionHistory::default().payload(HistoryShape::Detailed),
        };

        let json = serde_json::to_value(Envelope::Query(request)).unwrap();
        assert_eq!(json["type"], "query");
        assert_eq!(json["content"]["playerState"]["publicKey"], "key0");
        assert_eq!(json["content"]["tableState"]["playerToActSeat"], 0);
        assert!(json["content"]["actionHistory"].as_array().unwrap().is_empty());
        assert_eq!(
            json["content"]["playerState"]["legalActions"]["actions"][0],
            "fold"
        );
    }

    #[test]
    fn history_shapes() {
        let mut history = ActionHistory::default();
        history.push(ActionHistoryEntry {
            round: HandPhase::Preflop,
            seat: 0,
            name: "alice".to_string(),
            action: Action::Raise,
            amount: Chips::new(200),
        });
        history.push(ActionHistoryEntry {
            round: HandPhase::Preflop,
            seat: 1,
            name: "bob".to_string(),
            action: Action::Fold,
            amount: Chips::ZERO,
        });

        let json = serde_json::to_string(&history.payload(HistoryShape::Detailed)).unwrap();
        assert_eq!(
            json,
            concat!(
                r#"[{"roundOfBetting":"preflop","name":"alice","action":"raise","betSize":200},"#,
                r#"{"roundOfBetting":"preflop","name":"bob","action":"fold","betSize":0}]"#
            )
        );

        let json = serde_json::to_string(&history.payload(HistoryShape::Compact)).unwrap();
        assert_eq!(json, r#"[["preflop",0,"raise",200],["preflop",1,"fold",0]]"#);

        assert_eq!("compact".parse(), Ok(HistoryShape::Compact));
        assert!("tuples".parse::<HistoryShape>().is_err());

        history.clear();
        assert!(history.is_empty());
    }
}
