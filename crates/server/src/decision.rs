// Copyright (C) 2025 Pokerhost Developers
// SPDX-License-Identifier: Apache-2.0

//! Channel used to request decisions from remote players.
use anyhow::Result;
use std::{future::Future, time::Duration};
use thiserror::Error;

use pokerhost_core::message::{DecisionRequest, DecisionResponse, Envelope};

use crate::directory::Counterpart;

/// Why a decision could not be obtained, the seat to act falls back to a
/// fold or a check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecisionError {
    /// The request could not be delivered.
    #[error("transport error: {0}")]
    Transport(String),
    /// The player responded with an error status.
    #[error("status code {0}")]
    Status(u16),
    /// The response body is not a decision.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// No response within the wait window.
    #[error("decision timeout")]
    Timeout,
    /// The seat has been evicted.
    #[error("seat evicted")]
    Evicted,
    /// The seat has no known destination.
    #[error("no destination for seat")]
    NoDestination,
    /// The table is shutting down.
    #[error("table shutdown")]
    Shutdown,
}

/// A channel to the remote players.
pub trait DecisionChannel: Send + Sync + 'static {
    /// Asks a player for a decision.
    fn decide(
        &self,
        to: &Counterpart,
        request: &DecisionRequest,
    ) -> impl Future<Output = Result<DecisionResponse, DecisionError>> + Send;

    /// Sends a state update to a player.
    fn notify(
        &self,
        to: &Counterpart,
        request: &DecisionRequest,
    ) -> impl Future<Output = Result<(), DecisionError>> + Send;
}

/// A decision channel that posts JSON to the player endpoint.
#[derive(Debug, Clone)]
pub struct HttpDecisionChannel {
    client: reqwest::Client,
}

impl HttpDecisionChannel {
    /// Creates a channel with a request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn post(
        &self,
        to: &Counterpart,
        envelope: &Envelope,
    ) -> Result<reqwest::Response, DecisionError> {
        let res = self
            .client
            .post(&to.endpoint)
            .json(envelope)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DecisionError::Timeout
                } else {
                    DecisionError::Transport(e.to_string())
                }
            })?;

        if !res.status().is_success() {
            return Err(DecisionError::Status(res.status().as_u16()));
        }

        Ok(res)
    }
}

impl DecisionChannel for HttpDecisionChannel {
    async fn decide(
        &self,
        to: &Counterpart,
        request: &DecisionRequest,
    ) -> Result<DecisionResponse, DecisionError> {
        let envelope = Envelope::Query(request.clone());
        let res = self.post(to, &envelope).await?;
        let body = res
            .bytes()
            .await
            .map_err(|e| DecisionError::Transport(e.to_string()))?;

        serde_json::from_slice::<DecisionResponse>(&body)
            .map_err(|e| DecisionError::Malformed(e.to_string()))
    }

    async fn notify(
        &self,
        to: &Counterpart,
        request: &DecisionRequest,
    ) -> Result<(), DecisionError> {
        let envelope = Envelope::Update(request.clone());
        self.post(to, &envelope).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(DecisionError::Status(503).to_string(), "status code 503");
        assert_eq!(DecisionError::Timeout.to_string(), "decision timeout");
    }

    #[tokio::test]
    async fn unreachable_endpoint() {
        let channel = HttpDecisionChannel::new(Duration::from_millis(500)).unwrap();
        let to = Counterpart {
            id: "k1".to_string(),
            name: "alice".to_string(),
            endpoint: "not a url".to_string(),
        };

        let res = channel.post(&to, &Envelope::Update(test_request())).await;
        assert!(matches!(res, Err(DecisionError::Transport(_))));
    }

    fn test_request() -> DecisionRequest {
        use ahash::AHashMap;
        use pokerhost_core::{
            TableEngine,
            message::{ActionHistory, HistoryShape},
            poker::{Chips, ForcedBets},
            view::StateProjector,
        };

        let mut engine = TableEngine::with_seed(2, ForcedBets::blinds(5, 10), 1);
        engine.sit_down(0, Chips::new(100)).unwrap();
        let occupants = AHashMap::new();
        let projector = StateProjector::new(&engine, &occupants);
        DecisionRequest {
            table_state: projector.public_view(),
            player_state: projector.private_view(0).unwrap(),
            action_history: ActionHistory::default().payload(HistoryShape::Compact),
        }
    }
}
