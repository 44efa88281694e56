//! Weighted reward selection.
//!
//! A draw is two-stage: roll a tier by weight, then pick uniformly among the
//! cards of that tier. A tier with one card drops that card as often as the
//! tier weight says, no matter how crowded the other tiers are.
//!
//! If the rolled tier has no cards, the draw falls back to a uniform pick
//! over the whole catalog.

use tracing::{debug, warn};

use crate::cards::{CardCatalog, CardDefinition};
use crate::core::{Rarity, RandomSource, RarityTable};
use crate::error::ConfigError;

/// Result of one draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Draw<'c> {
    /// The drawn card.
    pub card: &'c CardDefinition,

    /// Tier the weighted roll landed on. Differs from `card.rarity` only
    /// when `fallback` is set.
    pub rolled_tier: Rarity,

    /// The rolled tier was empty and the card came from the whole catalog.
    pub fallback: bool,
}

/// Draws cards from a catalog using a tier weight table.
#[derive(Clone, Copy, Debug)]
pub struct RewardSelector<'c> {
    catalog: &'c CardCatalog,
    rarities: &'c RarityTable,
}

impl<'c> RewardSelector<'c> {
    /// Create a selector. Fails if the weight table cannot be rolled.
    pub fn new(catalog: &'c CardCatalog, rarities: &'c RarityTable) -> Result<Self, ConfigError> {
        rarities.validate()?;
        Ok(Self { catalog, rarities })
    }

    /// The catalog being drawn from.
    #[must_use]
    pub fn catalog(&self) -> &'c CardCatalog {
        self.catalog
    }

    /// The weight table in use.
    #[must_use]
    pub fn rarities(&self) -> &'c RarityTable {
        self.rarities
    }

    /// Draw one card.
    pub fn draw<R: RandomSource>(&self, rng: &mut R) -> Draw<'c> {
        let Some(tier_idx) = rng.choose_weighted(&self.rarities.weights()) else {
            // Unreachable with a validated table; treat as an empty tier
            let card = self.draw_any(rng);
            warn!(card = %card.name, "no tier could be rolled, drew from whole catalog");
            return Draw {
                card,
                rolled_tier: card.rarity,
                fallback: true,
            };
        };
        let rolled_tier = Rarity::ALL[tier_idx];

        let draw = match self.pick_from_tier(rolled_tier, rng) {
            Some(card) => Draw {
                card,
                rolled_tier,
                fallback: false,
            },
            None => {
                let card = self.draw_any(rng);
                warn!(rarity = %rolled_tier, card = %card.name, "rolled tier has no cards, drew from whole catalog");
                Draw {
                    card,
                    rolled_tier,
                    fallback: true,
                }
            }
        };

        debug!(card = %draw.card.name, rarity = %draw.card.rarity, "card drawn");
        draw
    }

    /// Uniformly pick a card of `tier`. `None` if the tier is empty.
    pub fn pick_from_tier<R: RandomSource>(&self, tier: Rarity, rng: &mut R) -> Option<&'c CardDefinition> {
        let count = self.catalog.count_of_rarity(tier);
        if count == 0 {
            return None;
        }
        self.catalog.nth_of_rarity(tier, rng.pick_index(count))
    }

    fn draw_any<R: RandomSource>(&self, rng: &mut R) -> &'c CardDefinition {
        self.catalog.card_at(rng.pick_index(self.catalog.len()))
    }
}
