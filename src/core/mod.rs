//! Core engine types: users, rarity tiers, randomness, cooldowns, configuration.
//!
//! Everything here is independent of the catalog and the ledger. The host
//! configures the engine via `DropConfig` rather than modifying the core.

pub mod user;
pub mod rarity;
pub mod rng;
pub mod cooldown;
pub mod config;

pub use user::UserId;
pub use rarity::{Rarity, RarityTable, TierRule};
pub use rng::{DropRng, DropRngState, RandomSource, SequenceRng};
pub use cooldown::{next_eligible, WaitTime};
pub use config::{DropConfig, DEFAULT_COOLDOWN_SECS, DEFAULT_LEADERBOARD_SIZE};
