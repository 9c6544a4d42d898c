//! Request and Response models for the profile API
//!
//! DTOs used for serializing/deserializing HTTP query strings and bodies.

pub mod requests;
pub mod responses;

pub use requests::ProfileQuery;
pub use responses::{
    AdminStatsResponse, ErrorResponse, HealthResponse, ReloadResponse, ReloadingResponse,
    VolatileStatsResponse,
};
