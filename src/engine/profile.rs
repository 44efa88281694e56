//! Read-only per-user projections: level, profile summary, collection.

use serde::{Deserialize, Serialize};

use crate::cards::{CardCatalog, CardDefinition};
use crate::core::{Rarity, UserId};
use crate::error::{EngineError, NotFound, Result};
use crate::ledger::LedgerStore;

/// Experience cost of leaving `level` for the next one.
#[must_use]
pub const fn experience_for_level(level: u32) -> u64 {
    100 * level as u64
}

/// Level derived from total experience.
///
/// Level 1 starts at 0 experience; moving from level `L` to `L + 1` costs
/// `100 * L` more.
///
/// ```
/// use card_drop::engine::LevelProgress;
///
/// let progress = LevelProgress::from_experience(250);
/// assert_eq!(progress.level, 2);
/// assert_eq!(progress.into_level, 150);
/// assert_eq!(progress.to_next, 50);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub level: u32,
    /// Experience earned since reaching `level`.
    pub into_level: u64,
    /// Experience still needed for `level + 1`.
    pub to_next: u64,
}

impl LevelProgress {
    /// Compute the level for `experience`.
    #[must_use]
    pub fn from_experience(experience: u64) -> Self {
        let mut level = 1u32;
        let mut left = experience;
        while left >= experience_for_level(level) {
            left -= experience_for_level(level);
            level += 1;
        }
        Self {
            level,
            into_level: left,
            to_next: experience_for_level(level) - left,
        }
    }
}

/// Summary shown on a user's profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub user: UserId,
    pub username: String,
    pub experience: u64,
    pub level: LevelProgress,
    pub total_cards: u32,
    pub distinct_cards: usize,
}

impl ProfileSummary {
    /// Build the profile of `user`.
    pub fn load<L: LedgerStore>(store: &L, user: UserId) -> Result<Self> {
        let record = store
            .get_user(user)?
            .ok_or(EngineError::NotFound(NotFound::User(user)))?;
        let owned = store.owned_cards(user)?;

        Ok(Self {
            user,
            username: record.name,
            experience: record.experience,
            level: LevelProgress::from_experience(record.experience),
            total_cards: owned.iter().map(|h| h.count).sum(),
            distinct_cards: owned.len(),
        })
    }
}

/// One owned card with its count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedCard {
    pub card: CardDefinition,
    pub count: u32,
}

/// Owned cards grouped by tier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Non-empty tiers, rarest first.
    pub tiers: Vec<(Rarity, Vec<OwnedCard>)>,
}

impl Collection {
    /// Group a user's holdings by tier. Holdings of cards missing from the
    /// catalog are skipped.
    pub fn load<L: LedgerStore>(store: &L, catalog: &CardCatalog, user: UserId) -> Result<Self> {
        let owned = store.owned_cards(user)?;
        let mut tiers = Vec::new();

        for tier in Rarity::DISPLAY_ORDER {
            let cards: Vec<OwnedCard> = owned
                .iter()
                .filter_map(|h| {
                    catalog
                        .lookup(&h.card)
                        .filter(|c| c.rarity == tier)
                        .map(|c| OwnedCard {
                            card: c.clone(),
                            count: h.count,
                        })
                })
                .collect();
            if !cards.is_empty() {
                tiers.push((tier, cards));
            }
        }

        Ok(Self { tiers })
    }

    /// Does the user own nothing (that the catalog knows about)?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Cards of one tier.
    #[must_use]
    pub fn tier(&self, rarity: Rarity) -> &[OwnedCard] {
        self.tiers
            .iter()
            .find(|(r, _)| *r == rarity)
            .map_or(&[], |(_, cards)| cards.as_slice())
    }
}
