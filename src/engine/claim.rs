//! Claim resolution.
//!
//! A claim moves through `Eligible` → `Resolving` → `Complete`, or stops at
//! `OnCooldown` without touching the ledger. Resolving runs these steps in
//! order inside one ledger transaction:
//!
//! 1. draw a card
//! 2. artifact effect: coin flip for a bonus card or the loss of one owned card
//! 3. add the drawn card and note its owned count
//! 4. first-claim bonus card
//! 5. triple bonus when the drawn card's count is a multiple of three
//! 6. record the claim time
//! 7. grant base experience for the drawn card's tier
//!
//! Any ledger failure rolls the whole claim back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, info};

use super::selector::RewardSelector;
use crate::cards::{CardCatalog, CardDefinition};
use crate::core::{next_eligible, DropConfig, RandomSource, Rarity, UserId, WaitTime};
use crate::error::{ConfigError, EngineError, NotFound, Result};
use crate::ledger::{LedgerStore, UserRecord};

/// Probability that an artifact grants a bonus card instead of taking one.
pub const ARTIFACT_BONUS_CHANCE: f64 = 0.5;

/// Owned count step at which the triple bonus fires.
pub const TRIPLE_STEP: u32 = 3;

/// Claim state machine states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimState {
    Eligible,
    OnCooldown,
    Resolving,
    Complete,
}

/// Side effect of drawing an artifact card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactEffect {
    /// An extra card was drawn and added.
    Bonus(CardDefinition),
    /// One copy of this owned card was taken.
    Lost(String),
    /// The penalty fired but the user owned nothing.
    NothingToLose,
}

/// Returned when the user must wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownReport {
    pub next_eligible: DateTime<Utc>,
    pub remaining: WaitTime,
}

/// Everything a completed claim did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimResult {
    pub user: UserId,

    /// The drawn card.
    pub card: CardDefinition,

    /// Tier the weighted roll landed on.
    pub rolled_tier: Rarity,

    /// Present when `card` is an artifact.
    pub artifact: Option<ArtifactEffect>,

    /// Extra card granted on the user's first claim.
    pub first_claim_bonus: Option<CardDefinition>,

    /// Owned count of `card` right after it was added.
    pub owned_count: u32,

    /// Triple bonus experience, if `owned_count` hit a multiple of three.
    pub triple_bonus: Option<u64>,

    /// Base experience for the card's tier.
    pub base_experience: u64,

    /// Total experience granted by this claim.
    pub experience_gained: u64,

    /// Names of every card added by this claim, in the order added.
    pub cards_added: SmallVec<[String; 3]>,

    /// Sum of all owned counts after the claim.
    pub total_cards: u32,

    /// When the next claim becomes possible.
    pub next_claim_at: DateTime<Utc>,

    /// Wait until `next_claim_at`, from the claim time.
    pub next_claim_in: WaitTime,
}

/// Outcome of a claim request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimOutcome {
    OnCooldown(CooldownReport),
    Complete(Box<ClaimResult>),
}

impl ClaimOutcome {
    /// Terminal state of the claim.
    #[must_use]
    pub fn state(&self) -> ClaimState {
        match self {
            ClaimOutcome::OnCooldown(_) => ClaimState::OnCooldown,
            ClaimOutcome::Complete(_) => ClaimState::Complete,
        }
    }

    /// The claim result, if the claim went through.
    #[must_use]
    pub fn completed(&self) -> Option<&ClaimResult> {
        match self {
            ClaimOutcome::Complete(result) => Some(result.as_ref()),
            ClaimOutcome::OnCooldown(_) => None,
        }
    }

    /// Consume into the claim result, if the claim went through.
    #[must_use]
    pub fn into_completed(self) -> Option<ClaimResult> {
        match self {
            ClaimOutcome::Complete(result) => Some(*result),
            ClaimOutcome::OnCooldown(_) => None,
        }
    }
}

/// Runs claims against a ledger.
///
/// Owns its random source so every random decision of a claim is
/// reproducible from one seed.
pub struct RewardEngine<'c, R> {
    selector: RewardSelector<'c>,
    config: &'c DropConfig,
    rng: R,
}

impl<'c, R: RandomSource> RewardEngine<'c, R> {
    /// Create an engine. Fails if the config's weight table is invalid.
    pub fn new(catalog: &'c CardCatalog, config: &'c DropConfig, rng: R) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            selector: RewardSelector::new(catalog, &config.rarities)?,
            config,
            rng,
        })
    }

    /// The selector used for draws.
    #[must_use]
    pub fn selector(&self) -> &RewardSelector<'c> {
        &self.selector
    }

    /// Mutable access to the random source.
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Where a user stands at `now`: `Eligible` or `OnCooldown`.
    #[must_use]
    pub fn state_for(&self, user: &UserRecord, now: DateTime<Utc>) -> ClaimState {
        match self.cooldown_report(user, now) {
            Some(_) => ClaimState::OnCooldown,
            None => ClaimState::Eligible,
        }
    }

    /// The pending cooldown, or `None` if the user may claim at `now`.
    #[must_use]
    pub fn cooldown_report(&self, user: &UserRecord, now: DateTime<Utc>) -> Option<CooldownReport> {
        let next = next_eligible(user.last_claim, self.config.cooldown())?;
        (now < next).then(|| CooldownReport {
            next_eligible: next,
            remaining: WaitTime::until(next, now),
        })
    }

    /// Run one claim for `user` at `now`.
    ///
    /// The user row is created on first contact. A claim inside the
    /// cooldown window returns `ClaimOutcome::OnCooldown` and changes
    /// nothing.
    pub fn claim<L: LedgerStore>(
        &mut self,
        store: &mut L,
        user: UserId,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<ClaimOutcome> {
        store.create_user(user, username)?;
        let record = store
            .get_user(user)?
            .ok_or(EngineError::NotFound(NotFound::User(user)))?;

        if let Some(report) = self.cooldown_report(&record, now) {
            debug!(%user, state = ?ClaimState::OnCooldown, remaining = %report.remaining, "claim refused");
            return Ok(ClaimOutcome::OnCooldown(report));
        }

        debug!(%user, state = ?ClaimState::Resolving, "claim accepted");
        let result = store.atomically(|tx| self.resolve(tx, &record, now))?;

        info!(
            %user,
            card = %result.card.name,
            rarity = %result.card.rarity,
            experience = result.experience_gained,
            total_cards = result.total_cards,
            "claim complete"
        );
        Ok(ClaimOutcome::Complete(Box::new(result)))
    }

    fn resolve<L: LedgerStore>(
        &mut self,
        store: &mut L,
        user: &UserRecord,
        now: DateTime<Utc>,
    ) -> Result<ClaimResult> {
        let id = user.id;
        let rarities = self.selector.rarities();
        let first_claim = user.last_claim.is_none() && store.total_cards(id)? == 0;
        let mut cards_added: SmallVec<[String; 3]> = SmallVec::new();

        let draw = self.selector.draw(&mut self.rng);
        let card = draw.card;

        let artifact = if card.rarity.is_artifact() {
            Some(self.artifact_effect(store, id, &mut cards_added)?)
        } else {
            None
        };

        let owned_count = store.add_card(id, &card.name)?;
        cards_added.push(card.name.clone());

        let first_claim_bonus = if first_claim {
            let bonus = self.selector.draw(&mut self.rng).card;
            store.add_card(id, &bonus.name)?;
            cards_added.push(bonus.name.clone());
            debug!(user = %id, card = %bonus.name, "first claim bonus");
            Some(bonus.clone())
        } else {
            None
        };

        let triple_bonus = if owned_count > 0 && owned_count % TRIPLE_STEP == 0 {
            let bonus = rarities.triple_bonus(card.rarity);
            store.add_experience(id, bonus)?;
            debug!(user = %id, card = %card.name, owned_count, bonus, "triple bonus");
            Some(bonus)
        } else {
            None
        };

        store.update_last_claim(id, now)?;

        let base_experience = rarities.experience(card.rarity);
        store.add_experience(id, base_experience)?;

        let total_cards = store.total_cards(id)?;
        let next_claim_at = next_eligible(Some(now), self.config.cooldown()).unwrap_or(now);

        Ok(ClaimResult {
            user: id,
            card: card.clone(),
            rolled_tier: draw.rolled_tier,
            artifact,
            first_claim_bonus,
            owned_count,
            triple_bonus,
            base_experience,
            experience_gained: base_experience + triple_bonus.unwrap_or(0),
            cards_added,
            total_cards,
            next_claim_at,
            next_claim_in: WaitTime::until(next_claim_at, now),
        })
    }

    fn artifact_effect<L: LedgerStore>(
        &mut self,
        store: &mut L,
        id: UserId,
        cards_added: &mut SmallVec<[String; 3]>,
    ) -> Result<ArtifactEffect> {
        if self.rng.next_unit() < ARTIFACT_BONUS_CHANCE {
            let bonus = self.selector.draw(&mut self.rng).card;
            store.add_card(id, &bonus.name)?;
            cards_added.push(bonus.name.clone());
            debug!(user = %id, card = %bonus.name, "artifact bonus");
            return Ok(ArtifactEffect::Bonus(bonus.clone()));
        }

        let owned = store.owned_cards(id)?;
        if owned.is_empty() {
            debug!(user = %id, "artifact penalty with nothing to take");
            return Ok(ArtifactEffect::NothingToLose);
        }
        let victim = &owned[self.rng.pick_index(owned.len())];
        store.remove_card(id, &victim.card)?;
        debug!(user = %id, card = %victim.card, "artifact penalty");
        Ok(ArtifactEffect::Lost(victim.card.clone()))
    }
}
