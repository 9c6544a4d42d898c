//! Response DTOs for the profile API
//!
//! Defines the structure of outgoing HTTP response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{PlayerStats, StalePlayer, VolatileStats};
use crate::tasks::ReloadSummary;

/// Body of the 202 returned while an unavailable profile is being fetched
#[derive(Debug, Clone, Serialize)]
pub struct ReloadingResponse {
    pub status: String,
}

impl ReloadingResponse {
    pub fn new() -> Self {
        Self {
            status: "Reloading".to_string(),
        }
    }
}

impl Default for ReloadingResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Volatile tier counters as exposed by the admin view
#[derive(Debug, Clone, Serialize)]
pub struct VolatileStatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub rejected: u64,
    pub total_entries: usize,
    pub hit_rate: f64,
}

impl From<VolatileStats> for VolatileStatsResponse {
    fn from(stats: VolatileStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            rejected: stats.rejected,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for `GET /_admin/stats`
#[derive(Debug, Clone, Serialize)]
pub struct AdminStatsResponse {
    pub now: DateTime<Utc>,
    #[serde(flatten)]
    pub players: PlayerStats,
    /// Seconds since the oldest cached profile was synced
    pub since_oldest_update_secs: Option<i64>,
    pub stale_players: Vec<StalePlayer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volatile: Option<VolatileStatsResponse>,
}

impl AdminStatsResponse {
    pub fn new(
        now: DateTime<Utc>,
        players: PlayerStats,
        stale_players: Vec<StalePlayer>,
        volatile: Option<VolatileStats>,
    ) -> Self {
        let since_oldest_update_secs = players
            .oldest_player_sync
            .map(|oldest| (now - oldest).num_seconds());
        Self {
            now,
            players,
            since_oldest_update_secs,
            stale_players,
            volatile: volatile.map(VolatileStatsResponse::from),
        }
    }
}

/// Response body for `GET|POST /admin/reloadAll`
#[derive(Debug, Clone, Serialize)]
pub struct ReloadResponse {
    pub message: String,
    #[serde(flatten)]
    pub summary: ReloadSummary,
}

impl ReloadResponse {
    pub fn new(summary: ReloadSummary) -> Self {
        Self {
            message: format!("Scheduled {} of {} expired profiles", summary.queued, summary.found),
            summary,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_reloading_response_serialize() {
        let json = serde_json::to_string(&ReloadingResponse::new()).unwrap();
        assert_eq!(json, r#"{"status":"Reloading"}"#);
    }

    #[test]
    fn test_admin_stats_since_oldest() {
        let now = Utc::now();
        let players = PlayerStats {
            player_count: 3,
            stale_player_count: 1,
            oldest_player_sync: Some(now - TimeDelta::hours(2)),
        };

        let resp = AdminStatsResponse::new(now, players, Vec::new(), None);
        assert_eq!(resp.since_oldest_update_secs, Some(7200));

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["player_count"], 3);
        assert_eq!(json["stale_player_count"], 1);
        assert!(json.get("volatile").is_none());
    }

    #[test]
    fn test_admin_stats_empty_store() {
        let players = PlayerStats {
            player_count: 0,
            stale_player_count: 0,
            oldest_player_sync: None,
        };
        let resp = AdminStatsResponse::new(Utc::now(), players, Vec::new(), None);
        assert!(resp.since_oldest_update_secs.is_none());
    }

    #[test]
    fn test_reload_response_flattens_summary() {
        let resp = ReloadResponse::new(ReloadSummary {
            found: 4,
            queued: 3,
            duplicates: 1,
            failed: 0,
        });
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["queued"], 3);
        assert!(json["message"].as_str().unwrap().contains("3 of 4"));
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
