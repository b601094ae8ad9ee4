// Copyright (C) 2025 Pokerhost Developers
// SPDX-License-Identifier: Apache-2.0

//! Directory of the remote players that can be seated.
use anyhow::{Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use std::{future::Future, path::Path, time::Duration};

/// A remote player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Counterpart {
    /// The player unique id.
    pub id: String,
    /// The display name.
    pub name: String,
    /// The URL decisions are requested from.
    pub endpoint: String,
}

/// A source of reachable remote players.
pub trait Directory: Send + Sync + 'static {
    /// Returns the players reachable now.
    fn reachable(&self) -> impl Future<Output = Result<Vec<Counterpart>>> + Send;
}

/// A directory with a fixed list of players.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    counterparts: Vec<Counterpart>,
}

impl StaticDirectory {
    /// Creates a directory with the given players.
    pub fn new(counterparts: Vec<Counterpart>) -> Self {
        Self { counterparts }
    }

    /// Loads the players from a JSON file with an array of players.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Cannot read players file {}: {e}", path.display()))?;
        let counterparts = serde_json::from_str::<Vec<Counterpart>>(&json)
            .map_err(|e| anyhow!("Invalid players file {}: {e}", path.display()))?;

        if counterparts.is_empty() {
            bail!("No players in {}", path.display());
        }

        Ok(Self::new(counterparts))
    }
}

impl Directory for StaticDirectory {
    async fn reachable(&self) -> Result<Vec<Counterpart>> {
        Ok(self.counterparts.clone())
    }
}

/// A directory service queried over HTTP.
///
/// The service responds to a GET with a JSON array of players.
#[derive(Debug, Clone)]
pub struct HttpDirectory {
    client: reqwest::Client,
    url: String,
}

impl HttpDirectory {
    /// Creates a directory for the given URL.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl Directory for HttpDirectory {
    async fn reachable(&self) -> Result<Vec<Counterpart>> {
        let res = self.client.get(&self.url).send().await?;
        if !res.status().is_success() {
            bail!("Directory {} status {}", self.url, res.status());
        }

        Ok(res.json::<Vec<Counterpart>>().await?)
    }
}
