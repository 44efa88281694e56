//! Error types.
//!
//! Configuration errors (`CatalogError`, `ConfigError`) are fatal and surface
//! at load time. Everything else is per-request: a cooldown or a missing
//! stack of three is a normal outcome, not an error, and `EngineError` never
//! needs to bring the hosting process down unless `is_fatal` says so.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::{Rarity, UserId};

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Card catalog failed validation.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Media file is neither `.gif` nor `.mp4`
    #[error("card '{card}': media file '{file}' has an unsupported format (only .gif and .mp4 are allowed)")]
    UnsupportedMedia { card: String, file: String },

    /// Media file is not present in the asset store
    #[error("card '{card}': media file '{file}' not found in the asset store")]
    MissingMedia { card: String, file: String },

    /// Rarity is not one of the five tiers
    #[error("card '{card}': unknown rarity '{rarity}'")]
    UnknownRarity { card: String, rarity: String },

    /// Two records share a name
    #[error("card '{0}' is defined more than once")]
    DuplicateCard(String),

    /// Catalog has no cards at all
    #[error("card catalog is empty")]
    EmptyCatalog,

    /// A populated tier upgrades into a tier with no cards
    #[error("{from} cards upgrade into {to}, but no {to} cards are defined")]
    MissingUpgradeTarget { from: Rarity, to: Rarity },

    /// Catalog file could not be read
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Catalog file is not valid JSON
    #[error("catalog parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Drop configuration failed validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Weight is negative, NaN or infinite
    #[error("invalid drop weight {weight} for {tier} tier")]
    InvalidWeight { tier: Rarity, weight: f64 },

    /// All weights are zero
    #[error("drop weights sum to zero; no tier can be rolled")]
    ZeroTotalWeight,

    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ledger store failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Backing storage could not complete the write
    #[error("ledger storage unavailable: {0}")]
    Unavailable(String),

    /// Mutation addressed a user that was never created
    #[error("{0} has no ledger record")]
    UnknownUser(UserId),

    /// Snapshot bytes could not be encoded or decoded
    #[error("ledger snapshot error: {0}")]
    Snapshot(String),
}

/// What a `NotFound` error could not find.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFound {
    Card(String),
    User(UserId),
}

impl std::fmt::Display for NotFound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotFound::Card(name) => write!(f, "card '{}'", name),
            NotFound::User(id) => write!(f, "{}", id),
        }
    }
}

/// Per-request engine error.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Catalog or weight table inconsistency (fatal)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Unknown card name or user
    #[error("{0} not found")]
    NotFound(NotFound),

    /// Terminal-tier card passed to upgrade
    #[error("card '{card}' is {rarity} and cannot be upgraded")]
    NotUpgradable { card: String, rarity: Rarity },

    /// Ledger store failed; the operation was rolled back
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl EngineError {
    /// Should this error abort the hosting process?
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Configuration(_))
    }
}

impl From<CatalogError> for EngineError {
    fn from(err: CatalogError) -> Self {
        EngineError::Configuration(err.to_string())
    }
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        EngineError::Configuration(err.to_string())
    }
}
