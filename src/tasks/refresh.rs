//! Refresh Worker
//!
//! Drains the refresh queue, running each job through the orchestrator.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::profile::ProfileService;
use crate::tasks::RefreshJob;

/// Spawns the task that runs queued refreshes one at a time.
///
/// The task ends once every sender of the queue is dropped.
pub fn spawn_refresh_worker(
    service: Arc<ProfileService>,
    mut jobs: mpsc::UnboundedReceiver<RefreshJob>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting refresh worker");

        while let Some(job) = jobs.recv().await {
            debug!(player = %job.player, full_update = job.full_update, "Running refresh job");
            match service.get_profile(&job.player, job.full_update).await {
                Ok(lookup) => match lookup.error {
                    Some(e) => warn!(player = %job.player, state = ?lookup.state, error = %e, "Refresh job incomplete"),
                    None => info!(player = %job.player, state = ?lookup.state, "Refresh job done"),
                },
                Err(e) => warn!(player = %job.player, error = %e, "Refresh job failed"),
            }
        }

        info!("Refresh queue closed, worker stopping");
    })
}
