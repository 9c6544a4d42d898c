//! Profile Module
//!
//! The player profile model, the external source it is scraped from, and the
//! refresh orchestration that keeps the cached copy current.

mod aggregator;
mod fetcher;
mod key;
mod model;
mod service;
pub mod source;

pub use aggregator::{AggregateError, StatFailure, StatsAggregator};
pub use fetcher::{FetchOutcome, PartialFetch, ProfileFetcher};
pub use key::{PlayerKey, MAX_PLAYER_KEY_LENGTH};
pub use model::{Character, CharacterStats, Profile, Ship};
pub use service::{Lookup, ProfileService, RefreshState};
pub use source::{ArenaLineup, DataSource, HttpDataSource, SourceError};
