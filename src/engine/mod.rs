//! Reward engines: draws, claims, upgrades, leaderboard and profile views.
//!
//! ## Key Types
//!
//! - `RewardSelector`: Two-stage weighted draw (tier, then card)
//! - `RewardEngine`: Cooldown-gated claim state machine
//! - `UpgradeEngine`: Three-for-one tier upgrades
//! - `LeaderboardAggregator`: Users ranked by experience
//! - `ProfileSummary` / `Collection`: Read-only per-user views
//!
//! Engines never hold ledger state; each operation takes the store it
//! works against, and mutations run inside `LedgerStore::atomically`.

pub mod selector;
pub mod claim;
pub mod upgrade;
pub mod leaderboard;
pub mod profile;

pub use selector::{Draw, RewardSelector};
pub use claim::{
    ArtifactEffect, ClaimOutcome, ClaimResult, ClaimState, CooldownReport, RewardEngine,
    ARTIFACT_BONUS_CHANCE, TRIPLE_STEP,
};
pub use upgrade::{UpgradeEngine, UpgradeResult, UPGRADE_COST};
pub use leaderboard::{LeaderboardAggregator, LeaderboardEntry};
pub use profile::{experience_for_level, Collection, LevelProgress, OwnedCard, ProfileSummary};
