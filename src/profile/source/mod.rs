//! External Data Source
//!
//! The fixed set of fetch operations the core needs from the profile site.

mod http;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::profile::{Character, CharacterStats, PlayerKey, Ship};

pub use http::HttpDataSource;

/// Failure of a single call to the external source.
///
/// The core does not distinguish "not found" from network trouble; every
/// variant is treated as transient.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("invalid upstream url: {0}")]
    Url(String),

    #[error("{0}")]
    Unavailable(String),
}

/// Current arena team plus the source's own last-update time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArenaLineup {
    pub lineup: Vec<CharacterStats>,
    pub last_update: DateTime<Utc>,
}

#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_arena_lineup(&self, player: &PlayerKey) -> Result<ArenaLineup, SourceError>;

    async fn fetch_collection(&self, player: &PlayerKey) -> Result<Vec<Character>, SourceError>;

    async fn fetch_ships(&self, player: &PlayerKey) -> Result<Vec<Ship>, SourceError>;

    async fn fetch_character_detail(
        &self,
        player: &PlayerKey,
        character: &str,
    ) -> Result<CharacterStats, SourceError>;
}
