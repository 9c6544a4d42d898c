//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Base URL of the external profile source
    pub upstream_url: String,
    /// Per-request timeout for the external source, in seconds
    pub upstream_timeout: u64,
    /// Snapshot file backing the durable store
    pub data_file: PathBuf,
    /// Age in seconds at which a cached profile becomes stale
    pub stale_after: u64,
    /// Deadline in seconds for a single refresh
    pub fetch_deadline: u64,
    /// Number of concurrent stat workers
    pub stats_workers: usize,
    /// Retries per character after the first failed attempt
    pub stats_retry_limit: u32,
    /// Fixed backoff between stat attempts, in milliseconds
    pub stats_retry_backoff_ms: u64,
    /// Maximum number of entries in the volatile tier
    pub volatile_max_entries: usize,
    /// TTL in seconds for volatile tier entries
    pub volatile_ttl: u64,
    /// Volatile tier expiry sweep interval in seconds
    pub cleanup_interval: u64,
    /// Interval in seconds between reload-expired sweeps
    pub reload_interval: u64,
    /// Number of stale players listed by the admin view
    pub stale_list_limit: usize,
}

/// Tunables for a single refresh, passed explicitly to the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub stale_after: Duration,
    pub fetch_deadline: Duration,
    pub workers: usize,
    pub retry_limit: u32,
    pub retry_backoff: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Config::default().refresh_policy()
    }
}

fn var_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `UPSTREAM_URL` - External source base URL (default: http://127.0.0.1:8081)
    /// - `UPSTREAM_TIMEOUT` - Per-request timeout in seconds (default: 30)
    /// - `DATA_FILE` - Durable store snapshot (default: profile-cache.json)
    /// - `STALE_AFTER` - Freshness threshold in seconds (default: 86400)
    /// - `FETCH_DEADLINE` - Refresh deadline in seconds (default: 120)
    /// - `STATS_WORKERS` - Stat worker pool size (default: 10)
    /// - `STATS_RETRY_LIMIT` - Retries per character (default: 2)
    /// - `STATS_RETRY_BACKOFF_MS` - Backoff between attempts (default: 1000)
    /// - `VOLATILE_MAX_ENTRIES` - Volatile tier capacity (default: 1000)
    /// - `VOLATILE_TTL` - Volatile tier TTL in seconds (default: 3600)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 60)
    /// - `RELOAD_INTERVAL` - Reload-expired frequency in seconds (default: 3600)
    /// - `STALE_LIST_LIMIT` - Admin stale list size (default: 100)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: var_or("SERVER_PORT", defaults.server_port),
            upstream_url: var_or("UPSTREAM_URL", defaults.upstream_url),
            upstream_timeout: var_or("UPSTREAM_TIMEOUT", defaults.upstream_timeout),
            data_file: var_or("DATA_FILE", defaults.data_file),
            stale_after: var_or("STALE_AFTER", defaults.stale_after),
            fetch_deadline: var_or("FETCH_DEADLINE", defaults.fetch_deadline),
            stats_workers: var_or("STATS_WORKERS", defaults.stats_workers).max(1),
            stats_retry_limit: var_or("STATS_RETRY_LIMIT", defaults.stats_retry_limit),
            stats_retry_backoff_ms: var_or(
                "STATS_RETRY_BACKOFF_MS",
                defaults.stats_retry_backoff_ms,
            ),
            volatile_max_entries: var_or("VOLATILE_MAX_ENTRIES", defaults.volatile_max_entries),
            volatile_ttl: var_or("VOLATILE_TTL", defaults.volatile_ttl),
            cleanup_interval: var_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            reload_interval: var_or("RELOAD_INTERVAL", defaults.reload_interval),
            stale_list_limit: var_or("STALE_LIST_LIMIT", defaults.stale_list_limit),
        }
    }

    /// Refresh tunables derived from this configuration.
    pub fn refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy {
            stale_after: Duration::from_secs(self.stale_after),
            fetch_deadline: Duration::from_secs(self.fetch_deadline),
            workers: self.stats_workers.max(1),
            retry_limit: self.stats_retry_limit,
            retry_backoff: Duration::from_millis(self.stats_retry_backoff_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            upstream_url: "http://127.0.0.1:8081".to_string(),
            upstream_timeout: 30,
            data_file: PathBuf::from("profile-cache.json"),
            stale_after: 24 * 60 * 60,
            fetch_deadline: 120,
            stats_workers: 10,
            stats_retry_limit: 2,
            stats_retry_backoff_ms: 1000,
            volatile_max_entries: 1000,
            volatile_ttl: 3600,
            cleanup_interval: 60,
            reload_interval: 3600,
            stale_list_limit: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.stale_after, 86_400);
        assert_eq!(config.fetch_deadline, 120);
        assert_eq!(config.stats_workers, 10);
        assert_eq!(config.stats_retry_limit, 2);
        assert_eq!(config.stale_list_limit, 100);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("SERVER_PORT");
        env::remove_var("STALE_AFTER");
        env::remove_var("STATS_WORKERS");
        env::remove_var("FETCH_DEADLINE");

        let config = Config::from_env();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.stale_after, 86_400);
        assert_eq!(config.stats_workers, 10);
        assert_eq!(config.fetch_deadline, 120);
    }

    #[test]
    fn test_refresh_policy_reference_values() {
        let policy = RefreshPolicy::default();
        assert_eq!(policy.stale_after, Duration::from_secs(24 * 60 * 60));
        assert_eq!(policy.fetch_deadline, Duration::from_secs(120));
        assert_eq!(policy.workers, 10);
        assert_eq!(policy.retry_limit, 2);
        assert_eq!(policy.retry_backoff, Duration::from_secs(1));
    }

    #[test]
    fn test_refresh_policy_never_has_zero_workers() {
        let config = Config {
            stats_workers: 0,
            ..Config::default()
        };
        assert_eq!(config.refresh_policy().workers, 1);
    }
}
