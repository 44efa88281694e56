//! Drop configuration.
//!
//! The host configures the engine at startup by providing a `DropConfig`:
//! - `cooldown_secs`: minimum interval between two claims by one user
//! - `leaderboard_size`: default number of leaderboard rows
//! - `rarities`: per-tier drop weight, base experience and triple bonus
//!
//! Configuration is validated eagerly; a bad weight table must stop the
//! process before it serves a single claim.

use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::rarity::{Rarity, RarityTable};
use crate::error::ConfigError;

/// Default cooldown between claims (2 hours).
pub const DEFAULT_COOLDOWN_SECS: u64 = 7200;

/// Default leaderboard length.
pub const DEFAULT_LEADERBOARD_SIZE: usize = 10;

/// Complete engine configuration.
///
/// ## Example
///
/// ```
/// use card_drop::core::{DropConfig, Rarity};
///
/// let config = DropConfig::default()
///     .with_cooldown_secs(3600)
///     .with_weight(Rarity::Artifact, 1.0);
///
/// assert_eq!(config.cooldown().num_minutes(), 60);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropConfig {
    /// Seconds a user must wait between claims.
    pub cooldown_secs: u64,

    /// Rows returned by the leaderboard when no size is given.
    pub leaderboard_size: usize,

    /// Per-tier rules.
    pub rarities: RarityTable,
}

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
            rarities: RarityTable::default(),
        }
    }
}

impl DropConfig {
    /// Parse and validate a JSON config document.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: DropConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Check the weight table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rarities.validate()
    }

    /// Cooldown as a duration.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        let secs = i64::try_from(self.cooldown_secs).unwrap_or(i64::MAX);
        Duration::seconds(secs.min(i64::MAX / 1000))
    }

    /// Set the cooldown.
    #[must_use]
    pub fn with_cooldown_secs(mut self, secs: u64) -> Self {
        self.cooldown_secs = secs;
        self
    }

    /// Set the default leaderboard size.
    #[must_use]
    pub fn with_leaderboard_size(mut self, size: usize) -> Self {
        self.leaderboard_size = size;
        self
    }

    /// Replace the rarity table.
    #[must_use]
    pub fn with_rarities(mut self, rarities: RarityTable) -> Self {
        self.rarities = rarities;
        self
    }

    /// Replace one tier's drop weight.
    #[must_use]
    pub fn with_weight(mut self, tier: Rarity, weight: f64) -> Self {
        self.rarities.get_mut(tier).weight = weight;
        self
    }
}
