// Copyright (C) 2025 Pokerhost Developers
// SPDX-License-Identifier: Apache-2.0

//! The table handle and its configuration.
use anyhow::Result;
use log::{error, info};
use parking_lot::Mutex;
use std::{sync::Arc, time::Duration};
use tokio::sync::{broadcast, mpsc, oneshot};

use pokerhost_core::{
    message::HistoryShape,
    poker::{Chips, ForcedBets},
    view::GameSnapshot,
};

use crate::{decision::DecisionChannel, directory::Directory};

mod roster;
mod scheduler;
mod state;

pub use roster::Roster;
pub use scheduler::{Fired, Scheduler, Timer};
pub use state::HandOrchestrator;

/// Table configuration.
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// The number of seats.
    pub seats: usize,
    /// The forced bets.
    pub forced_bets: ForcedBets,
    /// The chips given to a player when seated.
    pub buy_in: Chips,
    /// How long to wait for a decision.
    pub decision_timeout: Duration,
    /// The retry delay when there are not enough players.
    pub table_empty_delay: Duration,
    /// The delay between hands.
    pub new_hand_delay: Duration,
    /// The delay between hand steps.
    pub step_delay: Duration,
    /// Consecutive missed decisions before a player is removed.
    pub max_missed: u32,
    /// The action history shape sent to players.
    pub history: HistoryShape,
    /// Seed for the deck shuffles.
    pub seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            seats: 9,
            forced_bets: ForcedBets::blinds(5, 10),
            buy_in: Chips::new(300),
            decision_timeout: Duration::from_secs(30),
            table_empty_delay: Duration::from_secs(30),
            new_hand_delay: Duration::from_secs(10),
            step_delay: Duration::from_secs(5),
            max_missed: 3,
            history: HistoryShape::Detailed,
            seed: None,
        }
    }
}

/// Command for the table task.
#[derive(Debug)]
pub enum TableCommand {
    /// Removes a player at the next hand boundary.
    Evict {
        /// The player id.
        id: String,
        /// Receives true if the player was seated.
        resp_tx: oneshot::Sender<bool>,
    },
}

/// A table driven by a task that plays hands with the players from a
/// directory.
#[derive(Debug)]
pub struct Table {
    /// Channel for sending commands.
    commands_tx: mpsc::Sender<TableCommand>,
    /// The last published table state.
    snapshot: Arc<Mutex<GameSnapshot>>,
}

impl Table {
    /// Creates a new table and spawns its task.
    pub fn new<D, C>(
        config: TableConfig,
        directory: D,
        channel: Arc<C>,
        shutdown_broadcast_rx: broadcast::Receiver<()>,
        shutdown_complete_tx: mpsc::Sender<()>,
    ) -> Self
    where
        D: Directory,
        C: DecisionChannel,
    {
        // There must be at least 2 seats.
        assert!(config.seats > 1);

        let (commands_tx, commands_rx) = mpsc::channel(128);

        let mut task = HandOrchestrator::new(
            config,
            directory,
            channel,
            commands_rx,
            shutdown_broadcast_rx,
            shutdown_complete_tx,
        );
        let snapshot = task.snapshot_handle();

        tokio::spawn(async move {
            if let Err(err) = task.run().await {
                error!("Table error {err}");
            }

            info!("Table task stopped");
        });

        Self {
            commands_tx,
            snapshot,
        }
    }

    /// Evicts a player, returns false if the player is not seated.
    ///
    /// A pending decision of the player resolves with the fallback action and
    /// the player leaves the table when the hand ends.
    pub async fn evict(&self, id: &str) -> Result<bool> {
        let (resp_tx, resp_rx) = oneshot::channel();

        self.commands_tx
            .send(TableCommand::Evict {
                id: id.to_string(),
                resp_tx,
            })
            .await?;

        Ok(resp_rx.await?)
    }

    /// The current table state.
    pub fn snapshot(&self) -> GameSnapshot {
        self.snapshot.lock().clone()
    }
}
