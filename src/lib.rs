//! # card-drop
//!
//! Reward and progression engine for cooldown-gated card collection games.
//!
//! Users claim a random card every cooldown window. Cards come in five
//! rarity tiers; each claim grants experience for the drawn card's tier,
//! and collecting the same card in stacks of three pays a bonus. Three
//! identical cards can be upgraded into a random card of the next tier.
//!
//! ## Design Principles
//!
//! 1. **Host-Agnostic**: No chat, HTTP or database code. The host passes in
//!    user ids, timestamps and a `LedgerStore`.
//!
//! 2. **Deterministic**: Every random decision goes through a
//!    `RandomSource`. Seed a `DropRng` (or script a `SequenceRng`) and a
//!    claim replays exactly.
//!
//! 3. **All or Nothing**: Claims and upgrades run inside
//!    `LedgerStore::atomically`. A storage failure leaves the ledger as it
//!    was.
//!
//! ## Modules
//!
//! - `core`: User ids, rarity tiers, RNG, cooldown arithmetic, configuration
//! - `cards`: Card definitions, media validation, the catalog
//! - `ledger`: Progression storage trait and the in-memory ledger
//! - `engine`: Selector, claims, upgrades, leaderboard, profiles
//! - `error`: Error types

pub mod core;
pub mod cards;
pub mod ledger;
pub mod engine;
pub mod error;

// Re-export commonly used types
pub use crate::core::{
    UserId, Rarity, RarityTable, TierRule,
    DropRng, DropRngState, RandomSource, SequenceRng,
    WaitTime, DropConfig,
};

pub use crate::cards::{
    CardDefinition, CardView, MediaRef,
    MediaStore, DirMediaStore, MemoryMediaStore,
    CardCatalog, CatalogRecord,
};

pub use crate::ledger::{Holding, LedgerStore, UserRecord, MemoryLedger};

pub use crate::engine::{
    Draw, RewardSelector,
    ArtifactEffect, ClaimOutcome, ClaimResult, ClaimState, CooldownReport, RewardEngine,
    UpgradeEngine, UpgradeResult,
    LeaderboardAggregator, LeaderboardEntry,
    Collection, LevelProgress, OwnedCard, ProfileSummary,
};

pub use crate::error::{CatalogError, ConfigError, EngineError, LedgerError, NotFound, Result};
