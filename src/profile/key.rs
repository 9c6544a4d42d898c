//! Player Key
//!
//! Normalized player identifier used across the core.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, Result};

/// Maximum allowed key length in bytes
pub const MAX_PLAYER_KEY_LENGTH: usize = 256;

/// An opaque, already-normalized player identifier.
///
/// Keys are trimmed once at the boundary. Case is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerKey(String);

impl PlayerKey {
    /// Validates and normalizes a raw player identifier.
    pub fn parse(raw: &str) -> Result<Self> {
        let key = raw.trim();
        if key.is_empty() {
            return Err(ProfileError::InvalidKey("Key cannot be empty".to_string()));
        }
        if key.len() > MAX_PLAYER_KEY_LENGTH {
            return Err(ProfileError::InvalidKey(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_PLAYER_KEY_LENGTH
            )));
        }
        Ok(Self(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PlayerKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
