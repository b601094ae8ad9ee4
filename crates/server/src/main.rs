// Copyright (C) 2025 Pokerhost Developers
// SPDX-License-Identifier: Apache-2.0
use clap::Parser;
use log::error;
use pokerhost_core::{
    message::HistoryShape,
    poker::{Chips, ForcedBets},
};
use pokerhost_server::{DirectorySource, server, table::TableConfig};
use std::{path::PathBuf, time::Duration};

/// Keeps the chips of a full table within `u32`.
const MAX_BUY_IN: i64 = u32::MAX as i64 / 9;

#[derive(Debug, Parser)]
struct Cli {
    /// Number of seats.
    #[clap(long, default_value_t = 9, value_parser = clap::value_parser!(u8).range(2..=9))]
    seats: u8,
    /// The small blind.
    #[clap(long, default_value_t = 5)]
    small_blind: u32,
    /// The big blind.
    #[clap(long, default_value_t = 10)]
    big_blind: u32,
    /// The ante.
    #[clap(long, default_value_t = 0)]
    ante: u32,
    /// The chips given to a seated player.
    #[clap(
        long,
        default_value_t = 300,
        value_parser = clap::value_parser!(u32).range(1..=MAX_BUY_IN)
    )]
    buy_in: u32,
    /// How long to wait for a player decision in milliseconds.
    #[clap(long, default_value_t = 30_000)]
    decision_timeout_ms: u64,
    /// Seconds before retrying to start a hand when there are not enough players.
    #[clap(long, default_value_t = 30)]
    table_empty_delay: u64,
    /// Seconds between hands.
    #[clap(long, default_value_t = 10)]
    new_hand_delay: u64,
    /// Milliseconds between hand steps.
    #[clap(long, default_value_t = 5_000)]
    step_delay_ms: u64,
    /// Consecutive missed decisions before a player is removed.
    #[clap(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    max_missed: u32,
    /// The action history shape, detailed or compact.
    #[clap(long, default_value = "detailed")]
    history: HistoryShape,
    /// The players directory service URL.
    #[clap(long, required_unless_present = "players", conflicts_with = "players")]
    directory_url: Option<String>,
    /// A JSON file with the players.
    #[clap(long)]
    players: Option<PathBuf>,
    /// Seed for reproducible shuffles.
    #[clap(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    if cli.small_blind > cli.big_blind {
        error!("The small blind must not exceed the big blind");
        return;
    }

    let directory = match (cli.directory_url, cli.players) {
        (Some(url), _) => DirectorySource::Http(url),
        (None, Some(path)) => DirectorySource::Static(path),
        (None, None) => {
            error!("A directory URL or a players file is required");
            return;
        }
    };

    let config = pokerhost_server::Config {
        table: TableConfig {
            seats: cli.seats as usize,
            forced_bets: ForcedBets::blinds(cli.small_blind, cli.big_blind).with_ante(cli.ante),
            buy_in: Chips::new(cli.buy_in),
            decision_timeout: Duration::from_millis(cli.decision_timeout_ms),
            table_empty_delay: Duration::from_secs(cli.table_empty_delay),
            new_hand_delay: Duration::from_secs(cli.new_hand_delay),
            step_delay: Duration::from_millis(cli.step_delay_ms),
            max_missed: cli.max_missed,
            history: cli.history,
            seed: cli.seed,
        },
        directory,
    };

    if let Err(e) = server::run(config).await {
        error!("{e}");
    }
}
