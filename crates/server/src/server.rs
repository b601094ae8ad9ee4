// Copyright (C) 2025 Pokerhost Developers
// SPDX-License-Identifier: Apache-2.0

//! Pokerhost server entry point.
use anyhow::{Result, anyhow};
use log::{debug, info};
use std::{path::PathBuf, pin::pin, sync::Arc};
use tokio::{
    signal,
    sync::{broadcast, mpsc},
    time::{self, Duration},
};

use pokerhost_core::view::GameSnapshot;

use crate::{
    decision::HttpDecisionChannel,
    directory::{HttpDirectory, StaticDirectory},
    table::{Table, TableConfig},
};

/// Where the table finds its players.
#[derive(Debug, Clone)]
pub enum DirectorySource {
    /// A directory service URL.
    Http(String),
    /// A JSON file with the players.
    Static(PathBuf),
}

/// Server config.
#[derive(Debug)]
pub struct Config {
    /// The table config.
    pub table: TableConfig,
    /// The players directory.
    pub directory: DirectorySource,
}

const DIRECTORY_TIMEOUT: Duration = Duration::from_secs(10);
const STATUS_INTERVAL: Duration = Duration::from_secs(30);

/// Server entry point.
pub async fn run(config: Config) -> Result<()> {
    let Config { table, directory } = config;

    let channel = Arc::new(
        HttpDecisionChannel::new(table.decision_timeout)
            .map_err(|e| anyhow!("Http client error: {e}"))?,
    );

    let (shutdown_broadcast_tx, _) = broadcast::channel(1);
    let (shutdown_complete_tx, mut shutdown_complete_rx) = mpsc::channel(1);

    info!(
        "Starting table with {} seats, blinds {}/{} ante {} buy in {}",
        table.seats,
        table.forced_bets.small_blind,
        table.forced_bets.big_blind,
        table.forced_bets.ante,
        table.buy_in
    );

    let table = match directory {
        DirectorySource::Http(url) => {
            info!("Players from directory {url}");
            let directory = HttpDirectory::new(url, DIRECTORY_TIMEOUT)?;
            Table::new(
                table,
                directory,
                channel,
                shutdown_broadcast_tx.subscribe(),
                shutdown_complete_tx.clone(),
            )
        }
        DirectorySource::Static(path) => {
            let directory = StaticDirectory::load(&path)?;
            info!("Players from {}", path.display());
            Table::new(
                table,
                directory,
                channel,
                shutdown_broadcast_tx.subscribe(),
                shutdown_complete_tx.clone(),
            )
        }
    };

    let mut shutdown_signal = pin!(signal::ctrl_c());
    let mut ticks = time::interval(STATUS_INTERVAL);

    loop {
        tokio::select! {
            res = &mut shutdown_signal => {
                res?;
                info!("Received shutdown signal...");
                break;
            }
            _ = ticks.tick() => log_status(&table.snapshot())?,
        }
    }

    // Notify the table to start shutdown then wait for the table task to
    // terminate and drop its shutdown channel.
    drop(shutdown_broadcast_tx);
    drop(shutdown_complete_tx);
    let _ = shutdown_complete_rx.recv().await;
    drop(table);

    Ok(())
}

fn log_status(snapshot: &GameSnapshot) -> Result<()> {
    info!(
        "Table {} with {} players, pot {} to act {}",
        snapshot.game_state,
        snapshot.players.len(),
        snapshot.pot_size,
        snapshot.action_on.as_deref().unwrap_or("none")
    );

    debug!("{}", serde_json::to_string(snapshot)?);
    Ok(())
}
