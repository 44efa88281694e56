//! Ledger store contract.
//!
//! The engines read and mutate per-user progress only through `LedgerStore`.
//! Implementations own the storage and must serialize concurrent writes for
//! the same user (a double claim inside the cooldown window or a double
//! upgrade of the same three cards is a storage-level race).
//!
//! Multi-step mutations run inside `atomically`: if the closure returns an
//! error, every write it made is rolled back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::UserId;
use crate::error::LedgerError;

/// Persistent per-user row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,

    /// Display name shown on the leaderboard.
    pub name: String,

    /// Total experience. Never decremented.
    pub experience: u64,

    /// Time of the last successful claim. `None` before the first claim.
    pub last_claim: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// Fresh record with no experience and no claim.
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            experience: 0,
            last_claim: None,
        }
    }
}

/// Owned copies of one card. `count` is always at least 1.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Holding {
    pub card: String,
    pub count: u32,
}

impl Holding {
    /// Create a holding.
    pub fn new(card: impl Into<String>, count: u32) -> Self {
        Self {
            card: card.into(),
            count,
        }
    }
}

/// Storage backend for user progress.
pub trait LedgerStore {
    /// Fetch a user row.
    fn get_user(&self, id: UserId) -> Result<Option<UserRecord>, LedgerError>;

    /// Insert a user row if it does not exist yet. Existing rows are kept.
    fn create_user(&mut self, id: UserId, name: &str) -> Result<(), LedgerError>;

    /// All holdings of a user in storage order. Empty for unknown users.
    fn owned_cards(&self, id: UserId) -> Result<Vec<Holding>, LedgerError>;

    /// Add one copy of `card`. Returns the new owned count.
    fn add_card(&mut self, id: UserId, card: &str) -> Result<u32, LedgerError>;

    /// Remove one copy of `card`. Returns false if none was owned.
    fn remove_card(&mut self, id: UserId, card: &str) -> Result<bool, LedgerError> {
        self.take_cards(id, card, 1)
    }

    /// Remove exactly `count` copies of `card`, or nothing if fewer are
    /// owned. Entries that reach zero are deleted.
    fn take_cards(&mut self, id: UserId, card: &str, count: u32) -> Result<bool, LedgerError>;

    /// Add to a user's experience.
    fn add_experience(&mut self, id: UserId, amount: u64) -> Result<(), LedgerError>;

    /// Record the time of a claim.
    fn update_last_claim(&mut self, id: UserId, at: DateTime<Utc>) -> Result<(), LedgerError>;

    /// Up to `n` users by experience, highest first. Ties keep storage order.
    fn top_by_experience(&self, n: usize) -> Result<Vec<UserRecord>, LedgerError>;

    /// Run `f` as one unit: either all of its writes persist or none do.
    fn atomically<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        Self: Sized,
        E: From<LedgerError>,
        F: FnOnce(&mut Self) -> Result<T, E>;

    // === Convenience Methods ===

    /// Owned count of one card (0 if none).
    fn card_count(&self, id: UserId, card: &str) -> Result<u32, LedgerError> {
        Ok(self
            .owned_cards(id)?
            .into_iter()
            .find(|h| h.card == card)
            .map_or(0, |h| h.count))
    }

    /// Sum of all owned counts.
    fn total_cards(&self, id: UserId) -> Result<u32, LedgerError> {
        Ok(self.owned_cards(id)?.iter().map(|h| h.count).sum())
    }
}
