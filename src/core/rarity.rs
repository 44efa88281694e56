//! Rarity tiers and their per-tier rules.
//!
//! The five tiers are fixed and ordered. Each tier carries a drop weight,
//! a base experience reward and a triple bonus. The upgrade successor of a
//! tier is fixed: common → rare → epic → legendary → artifact.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Card rarity tier, ordered from most to least common.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
    Artifact,
}

impl Rarity {
    /// All tiers in ascending order.
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Artifact,
    ];

    /// Tiers in collection display order (rarest first).
    pub const DISPLAY_ORDER: [Rarity; 5] = [
        Rarity::Artifact,
        Rarity::Legendary,
        Rarity::Epic,
        Rarity::Rare,
        Rarity::Common,
    ];

    /// Position in `ALL`.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Upgrade target. `None` for the terminal tier.
    #[must_use]
    pub const fn successor(self) -> Option<Rarity> {
        match self {
            Rarity::Common => Some(Rarity::Rare),
            Rarity::Rare => Some(Rarity::Epic),
            Rarity::Epic => Some(Rarity::Legendary),
            Rarity::Legendary => Some(Rarity::Artifact),
            Rarity::Artifact => None,
        }
    }

    /// Is this the top tier with the bonus-or-penalty effect?
    #[must_use]
    pub const fn is_artifact(self) -> bool {
        matches!(self, Rarity::Artifact)
    }

    /// Lowercase tier name as it appears in catalog files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
            Rarity::Artifact => "artifact",
        }
    }

    /// Parse a catalog tier name (exact lowercase match).
    #[must_use]
    pub fn parse(name: &str) -> Option<Rarity> {
        Rarity::ALL.into_iter().find(|r| r.as_str() == name)
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rules for a single tier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierRule {
    /// Relative drop weight. Non-negative; need not sum to 1 across tiers.
    pub weight: f64,

    /// Experience granted when a card of this tier is claimed.
    pub experience: u64,

    /// Experience granted when the owned count of a card of this tier
    /// reaches a multiple of three.
    pub triple_bonus: u64,
}

impl TierRule {
    /// Create a tier rule.
    #[must_use]
    pub const fn new(weight: f64, experience: u64, triple_bonus: u64) -> Self {
        Self {
            weight,
            experience,
            triple_bonus,
        }
    }
}

/// Per-tier rules for all five tiers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RarityTable {
    pub common: TierRule,
    pub rare: TierRule,
    pub epic: TierRule,
    pub legendary: TierRule,
    pub artifact: TierRule,
}

impl Default for RarityTable {
    fn default() -> Self {
        Self {
            common: TierRule::new(69.89, 10, 50),
            rare: TierRule::new(20.0, 30, 150),
            epic: TierRule::new(8.0, 50, 300),
            legendary: TierRule::new(2.0, 100, 600),
            artifact: TierRule::new(0.01, 200, 1200),
        }
    }
}

impl RarityTable {
    /// Table that always rolls `tier`.
    ///
    /// Experience values are kept from the defaults.
    #[must_use]
    pub fn only(tier: Rarity) -> Self {
        let mut table = Self::default();
        for rarity in Rarity::ALL {
            table.get_mut(rarity).weight = if rarity == tier { 1.0 } else { 0.0 };
        }
        table
    }

    /// Rules for a tier.
    #[must_use]
    pub fn get(&self, tier: Rarity) -> &TierRule {
        match tier {
            Rarity::Common => &self.common,
            Rarity::Rare => &self.rare,
            Rarity::Epic => &self.epic,
            Rarity::Legendary => &self.legendary,
            Rarity::Artifact => &self.artifact,
        }
    }

    /// Mutable rules for a tier.
    pub fn get_mut(&mut self, tier: Rarity) -> &mut TierRule {
        match tier {
            Rarity::Common => &mut self.common,
            Rarity::Rare => &mut self.rare,
            Rarity::Epic => &mut self.epic,
            Rarity::Legendary => &mut self.legendary,
            Rarity::Artifact => &mut self.artifact,
        }
    }

    /// Replace the drop weight of a tier (builder pattern).
    #[must_use]
    pub fn with_weight(mut self, tier: Rarity, weight: f64) -> Self {
        self.get_mut(tier).weight = weight;
        self
    }

    /// Drop weights indexed by `Rarity::index`.
    #[must_use]
    pub fn weights(&self) -> [f64; 5] {
        Rarity::ALL.map(|r| self.get(r).weight)
    }

    /// Base experience for a tier.
    #[must_use]
    pub fn experience(&self, tier: Rarity) -> u64 {
        self.get(tier).experience
    }

    /// Triple bonus for a tier.
    #[must_use]
    pub fn triple_bonus(&self, tier: Rarity) -> u64 {
        self.get(tier).triple_bonus
    }

    /// Check that every weight is finite and non-negative and that at least
    /// one tier can be rolled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for tier in Rarity::ALL {
            let weight = self.get(tier).weight;
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidWeight { tier, weight });
            }
        }
        if self.weights().iter().sum::<f64>() <= 0.0 {
            return Err(ConfigError::ZeroTotalWeight);
        }
        Ok(())
    }
}
