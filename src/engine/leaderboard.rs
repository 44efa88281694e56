//! Experience leaderboard.

use serde::{Deserialize, Serialize};

use crate::core::UserId;
use crate::error::LedgerError;
use crate::ledger::LedgerStore;

/// One leaderboard row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position.
    pub rank: usize,
    pub user: UserId,
    pub username: String,
    pub experience: u64,
    /// Number of different cards owned.
    pub distinct_cards: usize,
    /// Sum of all owned counts.
    pub total_cards: u32,
}

/// Read-only ranking of users by experience.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LeaderboardAggregator {
    size: usize,
}

impl LeaderboardAggregator {
    /// Aggregator whose `board` returns `size` rows.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    /// Default number of rows.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// The default-size leaderboard.
    pub fn board<L: LedgerStore>(&self, store: &L) -> Result<Vec<LeaderboardEntry>, LedgerError> {
        Self::top(store, self.size)
    }

    /// Top `n` users by experience, highest first. Ties keep storage order.
    pub fn top<L: LedgerStore>(store: &L, n: usize) -> Result<Vec<LeaderboardEntry>, LedgerError> {
        store
            .top_by_experience(n)?
            .into_iter()
            .enumerate()
            .map(|(i, user)| {
                let owned = store.owned_cards(user.id)?;
                Ok(LeaderboardEntry {
                    rank: i + 1,
                    user: user.id,
                    username: user.name,
                    experience: user.experience,
                    distinct_cards: owned.len(),
                    total_cards: owned.iter().map(|h| h.count).sum(),
                })
            })
            .collect()
    }
}
