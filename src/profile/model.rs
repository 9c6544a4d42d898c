//! Profile Model
//!
//! The aggregated account data cached for one player.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// == Character ==
/// Summary of one roster entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    /// Star rating; zero means the character is not owned yet
    pub stars: i32,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub gear_level: u32,
    #[serde(default)]
    pub power: u64,
}

impl Character {
    /// Whether detail stats are worth fetching for this entry.
    pub fn is_active(&self) -> bool {
        self.stars > 0
    }
}

// == Ship ==
/// Summary of one owned ship.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    pub name: String,
    pub stars: i32,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub power: u64,
}

// == Character Stats ==
/// Detailed stat snapshot of a single character.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterStats {
    pub name: String,
    #[serde(default)]
    pub stars: i32,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub gear_level: u32,
    #[serde(default)]
    pub power: u64,
    #[serde(default)]
    pub health: u64,
    #[serde(default)]
    pub protection: u64,
    #[serde(default)]
    pub speed: u32,
    #[serde(default)]
    pub physical_damage: u64,
    #[serde(default)]
    pub special_damage: u64,
    #[serde(default)]
    pub potency: f64,
    #[serde(default)]
    pub tenacity: f64,
}

// == Profile ==
/// Everything cached for one player.
///
/// `last_update` is the time the source data was last known accurate;
/// `None` marks a profile that was never fetched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub collection: Vec<Character>,
    #[serde(default)]
    pub ships: Vec<Ship>,
    #[serde(default)]
    pub arena: Vec<CharacterStats>,
    /// Filled by a full update, in completion order
    #[serde(default)]
    pub stats: Vec<CharacterStats>,
}

impl Profile {
    pub fn is_virgin(&self) -> bool {
        self.last_update.is_none()
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Profile: {} characters, {} ships>",
            self.collection.len(),
            self.ships.len()
        )
    }
}
