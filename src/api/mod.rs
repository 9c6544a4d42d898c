//! API Module
//!
//! HTTP handlers and routing for the profile cache REST API.
//!
//! # Endpoints
//! - `GET|POST /v1/profile/:player` - Cached profile, refreshed when stale
//! - `GET /_admin/stats` - Freshness statistics
//! - `GET|POST /admin/reloadAll` - Queue a refresh of every stale profile
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
