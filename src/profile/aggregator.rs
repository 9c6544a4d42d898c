//! Parallel Stats Aggregator
//!
//! Fetches per-character detail stats with a fixed pool of workers. Each
//! worker owns one contiguous block of the roster; results and failures fan
//! in through two channels, each drained by a single collector task.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::config::RefreshPolicy;
use crate::profile::source::{DataSource, SourceError};
use crate::profile::{Character, CharacterStats, PlayerKey, Profile};

/// Terminal failure of one worker; the rest of its block was abandoned.
#[derive(Error, Debug)]
pub enum StatFailure {
    #[error("worker {worker} gave up on {character} after {attempts} attempts: {source}")]
    Exhausted {
        worker: usize,
        character: String,
        attempts: u32,
        #[source]
        source: SourceError,
    },

    #[error("worker {worker} cancelled at deadline while loading {character}")]
    Cancelled { worker: usize, character: String },
}

/// Every block failure collected during one aggregation.
#[derive(Debug)]
pub struct AggregateError {
    pub failures: Vec<StatFailure>,
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stat worker(s) failed: [", self.failures.len())?;
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{failure}")?;
        }
        f.write_str("]")
    }
}

impl std::error::Error for AggregateError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsAggregator {
    workers: usize,
    retry_limit: u32,
    retry_backoff: Duration,
}

impl StatsAggregator {
    pub fn new(workers: usize, retry_limit: u32, retry_backoff: Duration) -> Self {
        Self {
            workers: workers.max(1),
            retry_limit,
            retry_backoff,
        }
    }

    pub fn from_policy(policy: &RefreshPolicy) -> Self {
        Self::new(policy.workers, policy.retry_limit, policy.retry_backoff)
    }

    // == Partition ==
    /// Splits `len` items into `workers` contiguous ranges of `len / workers`,
    /// the last range absorbing the remainder.
    pub fn partition(&self, len: usize) -> Vec<(usize, usize)> {
        let step = len / self.workers;
        (0..self.workers)
            .map(|i| {
                let start = i * step;
                let end = if i + 1 == self.workers { len } else { start + step };
                (start, end)
            })
            .collect()
    }

    // == Fetch All ==
    /// Appends detail stats for every active roster entry to `profile.stats`.
    ///
    /// Stats land in completion order. Items fetched before a worker gave up
    /// are kept even when an error is returned. At `deadline` all in-flight
    /// workers are cancelled.
    pub async fn fetch_all(
        &self,
        source: Arc<dyn DataSource>,
        player: &PlayerKey,
        profile: &mut Profile,
        deadline: Instant,
    ) -> Result<(), AggregateError> {
        let (stat_tx, mut stat_rx) = mpsc::channel::<CharacterStats>(self.workers);
        let (fail_tx, mut fail_rx) = mpsc::channel::<StatFailure>(self.workers);
        let cancel = CancellationToken::new();

        let stats_collector = tokio::spawn(async move {
            let mut stats = Vec::new();
            while let Some(stat) = stat_rx.recv().await {
                stats.push(stat);
                debug!(collected = stats.len(), "Stats so far");
            }
            stats
        });
        let failure_collector = tokio::spawn(async move {
            let mut failures = Vec::new();
            while let Some(failure) = fail_rx.recv().await {
                debug!(error = %failure, "Stat worker failed");
                failures.push(failure);
            }
            failures
        });

        debug!(%player, workers = self.workers, roster = profile.collection.len(), "Starting stat workers");
        let mut workers = JoinSet::new();
        for (worker, (start, end)) in self.partition(profile.collection.len()).into_iter().enumerate() {
            let block = BlockWorker {
                worker,
                player: player.clone(),
                block: profile.collection[start..end].to_vec(),
                source: source.clone(),
                retry_limit: self.retry_limit,
                retry_backoff: self.retry_backoff,
                stats: stat_tx.clone(),
                failures: fail_tx.clone(),
                cancel: cancel.clone(),
            };
            workers.spawn(block.run());
        }
        // Collectors finish once the last worker drops its senders
        drop(stat_tx);
        drop(fail_tx);

        if timeout_at(deadline, join_workers(&mut workers)).await.is_err() {
            warn!(%player, "Stats deadline reached, cancelling workers");
            cancel.cancel();
            join_workers(&mut workers).await;
        }
        debug!(%player, "All stat workers are done");

        let stats = stats_collector.await.unwrap_or_else(|e| {
            error!(error = %e, "Stats collector task failed");
            Vec::new()
        });
        let failures = failure_collector.await.unwrap_or_else(|e| {
            error!(error = %e, "Failure collector task failed");
            Vec::new()
        });

        profile.stats.extend(stats);
        if failures.is_empty() {
            Ok(())
        } else {
            Err(AggregateError { failures })
        }
    }
}

async fn join_workers(workers: &mut JoinSet<()>) {
    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "Stat worker task failed");
        }
    }
}

// == Block Worker ==
struct BlockWorker {
    worker: usize,
    player: PlayerKey,
    block: Vec<Character>,
    source: Arc<dyn DataSource>,
    retry_limit: u32,
    retry_backoff: Duration,
    stats: mpsc::Sender<CharacterStats>,
    failures: mpsc::Sender<StatFailure>,
    cancel: CancellationToken,
}

impl BlockWorker {
    async fn run(self) {
        debug!(worker = self.worker, size = self.block.len(), "Starting worker");
        for character in &self.block {
            if !character.is_active() {
                debug!(worker = self.worker, character = %character.name, "Ignored inactive character");
                continue;
            }

            match self.fetch_with_retry(&character.name).await {
                Ok(stat) => {
                    if self.stats.send(stat).await.is_err() {
                        break;
                    }
                }
                Err(failure) => {
                    let _ = self.failures.send(failure).await;
                    break;
                }
            }
        }
        debug!(worker = self.worker, "Worker completed");
    }

    /// One first attempt plus up to `retry_limit` retries, with a fixed
    /// backoff between attempts.
    async fn fetch_with_retry(&self, name: &str) -> Result<CharacterStats, StatFailure> {
        let cancelled = || StatFailure::Cancelled {
            worker: self.worker,
            character: name.to_string(),
        };

        let mut attempts = 0;
        loop {
            attempts += 1;
            debug!(worker = self.worker, character = name, attempt = attempts, "Loading stats");

            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(cancelled()),
                result = self.source.fetch_character_detail(&self.player, name) => result,
            };

            match result {
                Ok(stat) => return Ok(stat),
                Err(source) if attempts > self.retry_limit => {
                    return Err(StatFailure::Exhausted {
                        worker: self.worker,
                        character: name.to_string(),
                        attempts,
                        source,
                    });
                }
                Err(e) => {
                    warn!(worker = self.worker, character = name, attempt = attempts, error = %e, "Stats fetch failed, retrying");
                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => return Err(cancelled()),
                        _ = tokio::time::sleep(self.retry_backoff) => {}
                    }
                }
            }
        }
    }
}
