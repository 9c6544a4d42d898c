//! Request DTOs for the profile API
//!
//! Defines the query parameters accepted by the HTTP endpoints.

use serde::{Deserialize, Deserializer};

/// Query string of `GET|POST /v1/profile/:player`
///
/// Only the literal `true` requests a full update, anything else is a
/// base lookup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileQuery {
    #[serde(default, rename = "fullUpdate", deserialize_with = "literal_true")]
    pub full_update: bool,
}

fn literal_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw == "true")
}
