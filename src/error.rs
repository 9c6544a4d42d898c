//! Error types for the profile cache
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::cache::StoreError;
use crate::models::ErrorResponse;
use crate::profile::{AggregateError, SourceError};
use crate::tasks::SchedulerError;

// == Profile Error Enum ==
/// Unified error type for profile lookups and refreshes.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// Player key rejected at the boundary
    #[error("Invalid player key: {0}")]
    InvalidKey(String),

    /// A single call to the external data source failed
    #[error("Upstream fetch failed: {0}")]
    Fetch(#[from] SourceError),

    /// One or more stat workers gave up; stats are partial
    #[error("Stats refresh incomplete: {0}")]
    AggregateFetch(#[from] AggregateError),

    /// Profile could not be serialized into a cache record
    #[error("Unable to encode profile: {0}")]
    Encode(#[source] serde_json::Error),

    /// Cached payload is not a valid profile
    #[error("Unable to decode cached profile: {0}")]
    Decode(#[source] serde_json::Error),

    /// Durable store read failed
    #[error("Store read failed: {0}")]
    Store(#[source] StoreError),

    /// Durable store write failed after a fetch
    #[error("Unable to save profile: {0}")]
    Persist(#[source] StoreError),

    /// Base fetch did not finish before the refresh deadline
    #[error("Fetch deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    /// No cached copy exists and the fetch produced nothing usable
    #[error("Profile {player} unavailable: {source}")]
    Unavailable {
        player: String,
        source: Box<ProfileError>,
    },

    /// Deferred refresh could not be queued
    #[error("Unable to schedule refresh: {0}")]
    Scheduler(#[from] SchedulerError),
}

// == IntoResponse Implementation ==
impl IntoResponse for ProfileError {
    fn into_response(self) -> Response {
        let status = match &self {
            ProfileError::InvalidKey(_) => StatusCode::BAD_REQUEST,
            ProfileError::Fetch(_)
            | ProfileError::AggregateFetch(_)
            | ProfileError::Unavailable { .. } => StatusCode::BAD_GATEWAY,
            ProfileError::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
            ProfileError::Scheduler(_) => StatusCode::SERVICE_UNAVAILABLE,
            ProfileError::Encode(_)
            | ProfileError::Decode(_)
            | ProfileError::Store(_)
            | ProfileError::Persist(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the profile cache.
pub type Result<T> = std::result::Result<T, ProfileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key_is_bad_request() {
        let response = ProfileError::InvalidKey("empty".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unavailable_is_bad_gateway() {
        let err = ProfileError::Unavailable {
            player: "ronoaldo".to_string(),
            source: Box::new(ProfileError::Fetch(SourceError::Status(503))),
        };
        assert!(err.to_string().contains("ronoaldo"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_deadline_is_gateway_timeout() {
        let response = ProfileError::DeadlineExceeded(Duration::from_secs(120)).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
