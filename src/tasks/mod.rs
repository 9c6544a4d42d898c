//! Background Tasks Module
//!
//! The refresh queue and the tasks that run alongside the HTTP server.
//!
//! # Tasks
//! - Refresh worker: runs queued profile refreshes
//! - Reload sweep: queues a refresh for every stale profile
//! - Cleanup: drops expired volatile tier entries

mod cleanup;
mod queue;
mod refresh;
mod reload;

pub use cleanup::spawn_cleanup_task;
pub use queue::{Enqueued, RefreshJob, RefreshQueue, RefreshScheduler, SchedulerError};
pub use refresh::spawn_refresh_worker;
pub use reload::{reload_expired, spawn_reload_task, ReloadSummary};
