//! Refresh Queue
//!
//! Deferred "refresh this player" jobs with per-day deduplication.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use crate::profile::PlayerKey;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("refresh queue is closed")]
    Closed,
}

/// A deferred refresh of one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshJob {
    pub player: PlayerKey,
    pub full_update: bool,
    /// Jobs sharing a dedup key collapse into the first one queued
    pub dedup_key: Option<String>,
}

impl RefreshJob {
    /// Follow-up full update, at most one per player per calendar day.
    pub fn full_update(player: PlayerKey, day: NaiveDate) -> Self {
        let dedup_key = format!("{}-{}", player, day.format("%Y%m%d"));
        Self {
            player,
            full_update: true,
            dedup_key: Some(dedup_key),
        }
    }

    /// Base refresh issued by the reload sweep, at most one per player per day.
    pub fn reload(player: PlayerKey, day: NaiveDate) -> Self {
        let dedup_key = format!("reload-{}-{}", player, day.format("%Y%m%d"));
        Self {
            player,
            full_update: false,
            dedup_key: Some(dedup_key),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    Queued,
    /// A job with the same dedup key is already pending
    Duplicate,
}

#[async_trait]
pub trait RefreshScheduler: Send + Sync {
    async fn enqueue(&self, job: RefreshJob) -> Result<Enqueued, SchedulerError>;
}

// == Refresh Queue ==
/// In-process queue drained by the refresh worker.
///
/// Dedup keys are remembered for the UTC day they were first seen, so a
/// player is not requeued on the same day even after its job has run.
#[derive(Debug)]
pub struct RefreshQueue {
    sender: mpsc::UnboundedSender<RefreshJob>,
    seen: Mutex<HashMap<String, NaiveDate>>,
}

impl RefreshQueue {
    /// Creates the queue and the receiving end for the worker.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RefreshJob>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let queue = Self {
            sender,
            seen: Mutex::new(HashMap::new()),
        };
        (queue, receiver)
    }

    /// Number of dedup keys remembered for today.
    pub fn remembered(&self) -> usize {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn push(&self, job: RefreshJob, today: NaiveDate) -> Result<Enqueued, SchedulerError> {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        seen.retain(|_, day| *day >= today);

        if let Some(key) = &job.dedup_key {
            if seen.contains_key(key) {
                debug!(player = %job.player, dedup_key = %key, "Refresh already scheduled");
                return Ok(Enqueued::Duplicate);
            }
        }

        let dedup_key = job.dedup_key.clone();
        self.sender.send(job).map_err(|_| SchedulerError::Closed)?;
        if let Some(key) = dedup_key {
            seen.insert(key, today);
        }
        Ok(Enqueued::Queued)
    }
}

#[async_trait]
impl RefreshScheduler for RefreshQueue {
    async fn enqueue(&self, job: RefreshJob) -> Result<Enqueued, SchedulerError> {
        self.push(job, Utc::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str) -> PlayerKey {
        PlayerKey::parse(name).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_dedup_key_is_per_player_per_day() {
        let job = RefreshJob::full_update(player("ronoaldo"), day(1));
        assert_eq!(job.dedup_key.as_deref(), Some("ronoaldo-20240301"));
        assert!(job.full_update);

        let reload = RefreshJob::reload(player("ronoaldo"), day(1));
        assert_ne!(reload.dedup_key, job.dedup_key);
        assert!(!reload.full_update);
    }

    #[test]
    fn test_same_day_duplicate_is_noop() {
        let (queue, mut rx) = RefreshQueue::new();

        let first = queue.push(RefreshJob::full_update(player("ronoaldo"), day(1)), day(1));
        let second = queue.push(RefreshJob::full_update(player("ronoaldo"), day(1)), day(1));

        assert_eq!(first, Ok(Enqueued::Queued));
        assert_eq!(second, Ok(Enqueued::Duplicate));
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_different_players_both_queued() {
        let (queue, mut rx) = RefreshQueue::new();

        queue.push(RefreshJob::full_update(player("ronoaldo"), day(1)), day(1)).unwrap();
        queue.push(RefreshJob::full_update(player("vader"), day(1)), day(1)).unwrap();

        assert_eq!(rx.try_recv().unwrap().player, player("ronoaldo"));
        assert_eq!(rx.try_recv().unwrap().player, player("vader"));
    }

    #[test]
    fn test_next_day_is_queued_again_and_prunes() {
        let (queue, mut rx) = RefreshQueue::new();

        queue.push(RefreshJob::full_update(player("ronoaldo"), day(1)), day(1)).unwrap();
        let next = queue.push(RefreshJob::full_update(player("ronoaldo"), day(2)), day(2));

        assert_eq!(next, Ok(Enqueued::Queued));
        assert_eq!(queue.remembered(), 1);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn test_jobs_without_dedup_key_always_queue() {
        let (queue, mut rx) = RefreshQueue::new();
        let job = RefreshJob {
            player: player("ronoaldo"),
            full_update: true,
            dedup_key: None,
        };

        queue.push(job.clone(), day(1)).unwrap();
        queue.push(job, day(1)).unwrap();
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_closed_queue_is_error() {
        let (queue, rx) = RefreshQueue::new();
        drop(rx);

        let result = queue
            .enqueue(RefreshJob::full_update(player("ronoaldo"), Utc::now().date_naive()))
            .await;
        assert_eq!(result, Err(SchedulerError::Closed));
        assert_eq!(queue.remembered(), 0);
    }
}
