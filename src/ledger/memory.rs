//! In-memory ledger backed by persistent collections.
//!
//! All tables live in `im` structures, so cloning them is O(1). That makes
//! `atomically` a snapshot-and-restore: take a copy before the closure runs,
//! put it back if the closure fails.
//!
//! The whole ledger can be written out with bincode for flat-file
//! persistence between restarts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::store::{Holding, LedgerStore, UserRecord};
use crate::core::UserId;
use crate::error::LedgerError;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Tables {
    users: im::HashMap<UserId, UserRecord>,
    /// User ids in creation order (storage order for ties).
    order: im::Vector<UserId>,
    holdings: im::HashMap<UserId, im::Vector<Holding>>,
}

/// In-memory `LedgerStore`.
///
/// ## Example
///
/// ```
/// use card_drop::core::UserId;
/// use card_drop::ledger::{LedgerStore, MemoryLedger};
///
/// let mut ledger = MemoryLedger::new();
/// let alice = UserId::new(1);
/// ledger.create_user(alice, "alice").unwrap();
///
/// assert_eq!(ledger.add_card(alice, "Bronze Knight").unwrap(), 1);
/// assert_eq!(ledger.add_card(alice, "Bronze Knight").unwrap(), 2);
/// assert!(ledger.take_cards(alice, "Bronze Knight", 2).unwrap());
/// assert!(ledger.owned_cards(alice).unwrap().is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryLedger {
    tables: Tables,
    /// Writes allowed before the simulated outage starts.
    outage_after: Option<usize>,
}

impl MemoryLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.tables.users.len()
    }

    /// Simulate a storage outage: the next `writes` writes succeed, every
    /// write after that fails with `LedgerError::Unavailable`.
    pub fn inject_outage_after(&mut self, writes: usize) {
        self.outage_after = Some(writes);
    }

    /// End a simulated outage.
    pub fn clear_outage(&mut self) {
        self.outage_after = None;
    }

    /// Encode all tables with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        bincode::serialize(&self.tables).map_err(|e| LedgerError::Snapshot(e.to_string()))
    }

    /// Decode tables written by `to_bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        let tables = bincode::deserialize(bytes).map_err(|e| LedgerError::Snapshot(e.to_string()))?;
        Ok(Self {
            tables,
            outage_after: None,
        })
    }

    /// Do two ledgers hold identical data?
    #[must_use]
    pub fn same_contents(&self, other: &MemoryLedger) -> bool {
        self.tables == other.tables
    }

    fn write(&mut self) -> Result<(), LedgerError> {
        match self.outage_after.as_mut() {
            Some(0) => Err(LedgerError::Unavailable("simulated outage".into())),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn user_mut(&mut self, id: UserId) -> Result<&mut UserRecord, LedgerError> {
        self.tables.users.get_mut(&id).ok_or(LedgerError::UnknownUser(id))
    }

    fn require_user(&self, id: UserId) -> Result<(), LedgerError> {
        if self.tables.users.contains_key(&id) {
            Ok(())
        } else {
            Err(LedgerError::UnknownUser(id))
        }
    }
}

impl LedgerStore for MemoryLedger {
    fn get_user(&self, id: UserId) -> Result<Option<UserRecord>, LedgerError> {
        Ok(self.tables.users.get(&id).cloned())
    }

    fn create_user(&mut self, id: UserId, name: &str) -> Result<(), LedgerError> {
        if self.tables.users.contains_key(&id) {
            return Ok(());
        }
        self.write()?;
        self.tables.users.insert(id, UserRecord::new(id, name));
        self.tables.order.push_back(id);
        Ok(())
    }

    fn owned_cards(&self, id: UserId) -> Result<Vec<Holding>, LedgerError> {
        Ok(self
            .tables
            .holdings
            .get(&id)
            .map(|cards| cards.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn add_card(&mut self, id: UserId, card: &str) -> Result<u32, LedgerError> {
        self.require_user(id)?;
        self.write()?;

        let cards = self.tables.holdings.entry(id).or_insert_with(im::Vector::new);
        if let Some(holding) = cards.iter_mut().find(|h| h.card == card) {
            holding.count += 1;
            return Ok(holding.count);
        }
        cards.push_back(Holding::new(card, 1));
        Ok(1)
    }

    fn take_cards(&mut self, id: UserId, card: &str, count: u32) -> Result<bool, LedgerError> {
        self.require_user(id)?;
        self.write()?;

        let Some(cards) = self.tables.holdings.get_mut(&id) else {
            return Ok(false);
        };
        let Some(pos) = cards.iter().position(|h| h.card == card) else {
            return Ok(false);
        };

        let owned = cards[pos].count;
        if owned < count {
            return Ok(false);
        }
        if owned == count {
            cards.remove(pos);
        } else {
            cards[pos].count = owned - count;
        }
        Ok(true)
    }

    fn add_experience(&mut self, id: UserId, amount: u64) -> Result<(), LedgerError> {
        self.require_user(id)?;
        self.write()?;
        let user = self.user_mut(id)?;
        user.experience = user.experience.saturating_add(amount);
        Ok(())
    }

    fn update_last_claim(&mut self, id: UserId, at: DateTime<Utc>) -> Result<(), LedgerError> {
        self.require_user(id)?;
        self.write()?;
        self.user_mut(id)?.last_claim = Some(at);
        Ok(())
    }

    fn top_by_experience(&self, n: usize) -> Result<Vec<UserRecord>, LedgerError> {
        let mut users: Vec<&UserRecord> = self
            .tables
            .order
            .iter()
            .filter_map(|id| self.tables.users.get(id))
            .collect();
        // Stable sort keeps creation order among equal experience
        users.sort_by(|a, b| b.experience.cmp(&a.experience));
        Ok(users.into_iter().take(n).cloned().collect())
    }

    fn atomically<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        E: From<LedgerError>,
        F: FnOnce(&mut Self) -> Result<T, E>,
    {
        let snapshot = self.tables.clone();
        let result = f(self);
        if result.is_err() {
            warn!("ledger transaction failed, rolling back");
            self.tables = snapshot;
        }
        result
    }
}
