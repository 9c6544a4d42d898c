//! Profile Cache - staleness-aware cache of scraped player profiles
//!
//! Serves cached profiles, refreshes stale ones from the upstream site and
//! fetches per-character detail stats with a bounded worker pool.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod profile;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::{Config, RefreshPolicy};
pub use error::{ProfileError, Result};
pub use profile::{Lookup, PlayerKey, Profile, ProfileService, RefreshState};
