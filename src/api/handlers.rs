//! API Handlers
//!
//! HTTP request handlers for each profile cache endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::cache::{gather_player_stats, list_stale_players, MemoryVolatileStore};
use crate::error::{ProfileError, Result};
use crate::models::{
    AdminStatsResponse, HealthResponse, ProfileQuery, ReloadResponse, ReloadingResponse,
};
use crate::profile::{PlayerKey, ProfileService};
use crate::tasks::{reload_expired, RefreshJob, RefreshScheduler};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ProfileService>,
    pub scheduler: Arc<dyn RefreshScheduler>,
    /// Present when the volatile tier is enabled; read for admin stats
    pub volatile: Option<MemoryVolatileStore>,
    pub stale_list_limit: usize,
}

impl AppState {
    pub fn new(
        service: Arc<ProfileService>,
        scheduler: Arc<dyn RefreshScheduler>,
        volatile: Option<MemoryVolatileStore>,
        stale_list_limit: usize,
    ) -> Self {
        Self {
            service,
            scheduler,
            volatile,
            stale_list_limit,
        }
    }
}

/// Handler for GET|POST /v1/profile/:player
///
/// Serves the profile even when the refresh carried an error. When there is
/// nothing to serve, queues a full update and answers 202.
pub async fn profile_handler(
    State(state): State<AppState>,
    Path(player): Path<String>,
    Query(query): Query<ProfileQuery>,
) -> Result<Response> {
    let player = PlayerKey::parse(&player)?;

    match state.service.get_profile(&player, query.full_update).await {
        Ok(lookup) => {
            if let Some(e) = &lookup.error {
                warn!(%player, state = ?lookup.state, error = %e, "Serving profile despite refresh error");
            }
            Ok(Json(lookup.profile).into_response())
        }
        Err(e @ ProfileError::Unavailable { .. }) => {
            warn!(%player, error = %e, "Profile unavailable, scheduling reload");
            let job = RefreshJob::full_update(player, Utc::now().date_naive());
            state.scheduler.enqueue(job).await?;
            Ok((StatusCode::ACCEPTED, Json(ReloadingResponse::new())).into_response())
        }
        Err(e) => Err(e),
    }
}

/// Handler for GET /_admin/stats
pub async fn admin_stats_handler(State(state): State<AppState>) -> Result<Json<AdminStatsResponse>> {
    let now = Utc::now();
    let durable = state.service.store().durable();
    let freshness = state.service.freshness();

    let players = gather_player_stats(durable.as_ref(), freshness, now)
        .await
        .map_err(ProfileError::Store)?;
    let stale = list_stale_players(durable.as_ref(), freshness, now, state.stale_list_limit)
        .await
        .map_err(ProfileError::Store)?;
    let volatile = match &state.volatile {
        Some(volatile) => Some(volatile.stats().await),
        None => None,
    };

    Ok(Json(AdminStatsResponse::new(now, players, stale, volatile)))
}

/// Handler for GET|POST /admin/reloadAll
pub async fn reload_all_handler(State(state): State<AppState>) -> Result<Json<ReloadResponse>> {
    info!("Running reload of all expired profiles");
    let summary = reload_expired(
        state.service.store().durable().as_ref(),
        state.scheduler.as_ref(),
        state.service.freshness(),
        Utc::now(),
    )
    .await
    .map_err(ProfileError::Store)?;

    Ok(Json(ReloadResponse::new(summary)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
