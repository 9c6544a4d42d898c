//! Cache Record Module
//!
//! The persisted envelope around a serialized profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, Result};
use crate::profile::{PlayerKey, Profile};

// == Cache Record ==
/// A serialized profile plus the time its data was last known accurate.
///
/// A record with no `last_update` and an empty payload stands for a
/// player that was never fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Player identifier
    pub key: String,
    /// Copied from the profile on encode
    pub last_update: Option<DateTime<Utc>>,
    /// Serialized profile, opaque to the stores
    pub payload: Vec<u8>,
}

impl CacheRecord {
    /// Creates the "not yet fetched" record for a key.
    pub fn virgin(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            last_update: None,
            payload: Vec::new(),
        }
    }

    // == Encode ==
    /// Serializes a profile, copying its `last_update` onto the envelope.
    pub fn encode(key: &PlayerKey, profile: &Profile) -> Result<Self> {
        let payload = serde_json::to_vec(profile).map_err(ProfileError::Encode)?;
        Ok(Self {
            key: key.as_str().to_string(),
            last_update: profile.last_update,
            payload,
        })
    }

    // == Decode ==
    /// Restores the profile held by this record.
    pub fn decode(&self) -> Result<Profile> {
        if self.is_virgin() {
            return Ok(Profile::default());
        }
        serde_json::from_slice(&self.payload).map_err(ProfileError::Decode)
    }

    /// True for the "not yet fetched" record.
    pub fn is_virgin(&self) -> bool {
        self.last_update.is_none() && self.payload.is_empty()
    }

    /// Approximate in-memory size in bytes.
    pub fn size(&self) -> usize {
        self.key.len() + self.payload.len()
    }
}
