//! Claim flow integration tests.
//!
//! These tests drive `RewardEngine` against a `MemoryLedger` with scripted
//! or seeded randomness and check the ledger afterwards.

mod common;

use chrono::Duration;

use card_drop::core::{DropConfig, DropRng, Rarity, RarityTable, SequenceRng, UserId, WaitTime};
use card_drop::engine::{ArtifactEffect, ClaimOutcome, ClaimState, RewardEngine};
use card_drop::error::{EngineError, LedgerError};
use card_drop::ledger::{LedgerStore, MemoryLedger};

use common::{catalog, init_tracing, returning_user, t0, window};

fn only(tier: Rarity) -> DropConfig {
    DropConfig::default().with_rarities(RarityTable::only(tier))
}

// =============================================================================
// Tier weights
// =============================================================================

/// With all weight on one tier, every card a claim grants is of that tier.
#[test]
fn test_all_weight_on_one_tier() {
    init_tracing();
    let cat = catalog();

    for tier in Rarity::ALL {
        let config = only(tier);
        let mut engine = RewardEngine::new(&cat, &config, DropRng::new(tier.index() as u64)).unwrap();
        let mut ledger = MemoryLedger::new();
        let id = UserId::new(1);

        for n in 0..40 {
            let result = engine
                .claim(&mut ledger, id, "tester", window(n))
                .unwrap()
                .into_completed()
                .unwrap();

            assert_eq!(result.card.rarity, tier);
            assert_eq!(result.rolled_tier, tier);
            if let Some(bonus) = &result.first_claim_bonus {
                assert_eq!(bonus.rarity, tier);
            }
            if let Some(ArtifactEffect::Bonus(bonus)) = &result.artifact {
                assert_eq!(bonus.rarity, tier);
            }
        }
    }
}

/// Same seed, same claims, same ledger.
#[test]
fn test_seeded_claims_replay() {
    let cat = catalog();
    let config = DropConfig::default();

    let run = || {
        let mut engine = RewardEngine::new(&cat, &config, DropRng::new(42)).unwrap();
        let mut ledger = MemoryLedger::new();
        let results: Vec<_> = (0..30)
            .map(|n| {
                engine
                    .claim(&mut ledger, UserId::new(n % 3), "player", window(n / 3))
                    .unwrap()
            })
            .collect();
        (results, ledger)
    };

    let (first, ledger_a) = run();
    let (second, ledger_b) = run();
    assert_eq!(first, second);
    assert!(ledger_a.same_contents(&ledger_b));
}

// =============================================================================
// Cooldown
// =============================================================================

/// A claim inside the cooldown changes nothing and draws nothing.
#[test]
fn test_claim_on_cooldown_is_idempotent() {
    let cat = catalog();
    let config = DropConfig::default();
    let mut engine = RewardEngine::new(&cat, &config, SequenceRng::constant(0.3)).unwrap();
    let mut ledger = MemoryLedger::new();
    let id = UserId::new(7);

    engine.claim(&mut ledger, id, "alice", t0()).unwrap();
    let after_first = ledger.clone();
    let draws = engine.rng_mut().consumed();

    for minutes in [0, 1, 60, 119] {
        let outcome = engine
            .claim(&mut ledger, id, "alice", t0() + Duration::minutes(minutes))
            .unwrap();
        assert_eq!(outcome.state(), ClaimState::OnCooldown);
        assert!(outcome.completed().is_none());
    }

    assert!(ledger.same_contents(&after_first));
    assert_eq!(engine.rng_mut().consumed(), draws);
}

/// The wait is reported in whole hours and minutes, truncated.
#[test]
fn test_cooldown_report() {
    let cat = catalog();
    let config = DropConfig::default();
    let mut engine = RewardEngine::new(&cat, &config, SequenceRng::constant(0.3)).unwrap();
    let mut ledger = MemoryLedger::new();
    let id = UserId::new(7);

    engine.claim(&mut ledger, id, "alice", t0()).unwrap();

    let outcome = engine
        .claim(&mut ledger, id, "alice", t0() + Duration::seconds(45 * 60 + 30))
        .unwrap();
    let ClaimOutcome::OnCooldown(report) = outcome else {
        panic!("expected cooldown");
    };
    assert_eq!(report.next_eligible, t0() + Duration::hours(2));
    assert_eq!(report.remaining, WaitTime { hours: 1, minutes: 14 });
    assert_eq!(report.remaining.to_string(), "1h 14m");

    // Exactly at the boundary the claim goes through
    let outcome = engine.claim(&mut ledger, id, "alice", t0() + Duration::hours(2)).unwrap();
    assert_eq!(outcome.state(), ClaimState::Complete);
}

/// A shorter configured cooldown is honoured.
#[test]
fn test_custom_cooldown() {
    let cat = catalog();
    let config = DropConfig::default().with_cooldown_secs(600);
    let mut engine = RewardEngine::new(&cat, &config, DropRng::new(1)).unwrap();
    let mut ledger = MemoryLedger::new();
    let id = UserId::new(1);

    let first = engine.claim(&mut ledger, id, "u", t0()).unwrap().into_completed().unwrap();
    assert_eq!(first.next_claim_in, WaitTime { hours: 0, minutes: 10 });

    let early = engine.claim(&mut ledger, id, "u", t0() + Duration::minutes(9)).unwrap();
    assert_eq!(early.state(), ClaimState::OnCooldown);
    let on_time = engine.claim(&mut ledger, id, "u", t0() + Duration::minutes(10)).unwrap();
    assert_eq!(on_time.state(), ClaimState::Complete);
}

// =============================================================================
// First claim
// =============================================================================

/// A brand-new user gets the drawn card plus one bonus card.
#[test]
fn test_first_claim_grants_two_cards() {
    let cat = catalog();
    let config = only(Rarity::Common);
    let mut engine = RewardEngine::new(&cat, &config, SequenceRng::constant(0.0)).unwrap();
    let mut ledger = MemoryLedger::new();
    let id = UserId::new(1);

    let result = engine.claim(&mut ledger, id, "alice", t0()).unwrap().into_completed().unwrap();

    assert_eq!(result.cards_added.len(), 2);
    assert_eq!(result.total_cards, 2);
    assert_eq!(result.owned_count, 1);
    assert_eq!(ledger.card_count(id, "Bronze Knight").unwrap(), 2);
    // Bonus cards carry no experience
    assert_eq!(ledger.get_user(id).unwrap().unwrap().experience, 10);
    assert_eq!(ledger.get_user(id).unwrap().unwrap().name, "alice");

    // Second claim has no bonus
    let result = engine.claim(&mut ledger, id, "alice", window(1)).unwrap().into_completed().unwrap();
    assert!(result.first_claim_bonus.is_none());
    assert_eq!(result.cards_added.len(), 1);
    assert_eq!(result.total_cards, 3);
}

/// An artifact bonus on the very first claim stacks with the first-claim card.
#[test]
fn test_first_claim_with_artifact_bonus() {
    let cat = catalog();
    let config = only(Rarity::Artifact);
    let mut engine = RewardEngine::new(&cat, &config, SequenceRng::constant(0.1)).unwrap();
    let mut ledger = MemoryLedger::new();
    let id = UserId::new(1);

    let result = engine.claim(&mut ledger, id, "alice", t0()).unwrap().into_completed().unwrap();

    assert!(matches!(result.artifact, Some(ArtifactEffect::Bonus(_))));
    assert!(result.first_claim_bonus.is_some());
    assert_eq!(result.cards_added.len(), 3);
    assert_eq!(result.total_cards, 3);
    assert_eq!(result.triple_bonus, None);
    assert_eq!(result.experience_gained, 200);
}

/// The artifact penalty on an empty collection takes nothing.
#[test]
fn test_first_claim_with_artifact_penalty() {
    let cat = catalog();
    let config = only(Rarity::Artifact);
    let mut engine = RewardEngine::new(&cat, &config, SequenceRng::constant(0.6)).unwrap();
    let mut ledger = MemoryLedger::new();
    let id = UserId::new(1);

    let result = engine.claim(&mut ledger, id, "alice", t0()).unwrap().into_completed().unwrap();

    assert_eq!(result.artifact, Some(ArtifactEffect::NothingToLose));
    assert_eq!(result.total_cards, 2);
}

// =============================================================================
// Artifact effect
// =============================================================================

/// Coin below one half: exactly one extra card, nothing removed.
#[test]
fn test_artifact_bonus_adds_one_card() {
    let cat = catalog();
    let config = only(Rarity::Artifact);
    let mut ledger = MemoryLedger::new();
    let id = returning_user(&mut ledger, 1, &["Bronze Knight"]);

    // tier roll, card pick, coin, bonus tier roll, bonus card pick
    let rng = SequenceRng::new(vec![0.0, 0.0, 0.2, 0.0, 0.0]);
    let mut engine = RewardEngine::new(&cat, &config, rng).unwrap();

    let result = engine.claim(&mut ledger, id, "u", t0()).unwrap().into_completed().unwrap();

    assert_eq!(result.card.name, "Old Relic");
    let Some(ArtifactEffect::Bonus(bonus)) = &result.artifact else {
        panic!("expected artifact bonus, got {:?}", result.artifact);
    };
    assert_eq!(bonus.name, "Old Relic");
    assert!(result.first_claim_bonus.is_none());
    assert_eq!(result.cards_added.len(), 2);
    assert_eq!(ledger.card_count(id, "Bronze Knight").unwrap(), 1);
    assert_eq!(ledger.card_count(id, "Old Relic").unwrap(), 2);
    assert_eq!(result.total_cards, 3);
}

/// Coin at or above one half: one owned card is taken, then the artifact added.
#[test]
fn test_artifact_penalty_removes_one_card() {
    let cat = catalog();
    let config = only(Rarity::Artifact);
    let mut ledger = MemoryLedger::new();
    let id = returning_user(&mut ledger, 1, &["Bronze Knight", "Slime"]);

    // tier roll, card pick, coin, victim pick (index 1 of 2)
    let rng = SequenceRng::new(vec![0.0, 0.0, 0.5, 0.6]);
    let mut engine = RewardEngine::new(&cat, &config, rng).unwrap();

    let result = engine.claim(&mut ledger, id, "u", t0()).unwrap().into_completed().unwrap();

    assert_eq!(result.artifact, Some(ArtifactEffect::Lost("Slime".to_string())));
    assert_eq!(ledger.card_count(id, "Slime").unwrap(), 0);
    assert_eq!(ledger.card_count(id, "Bronze Knight").unwrap(), 1);
    assert_eq!(ledger.card_count(id, "Old Relic").unwrap(), 1);
    assert_eq!(result.total_cards, 2);
    assert_eq!(result.cards_added.as_slice(), ["Old Relic".to_string()]);
}

// =============================================================================
// Triple bonus
// =============================================================================

/// The bonus fires when the drawn card's count reaches 3 and again at 6.
#[test]
fn test_triple_bonus_at_three_and_six() {
    let cat = catalog();
    let config = only(Rarity::Common);
    let mut engine = RewardEngine::new(&cat, &config, SequenceRng::constant(0.0)).unwrap();
    let mut ledger = MemoryLedger::new();
    let id = returning_user(&mut ledger, 1, &[]);

    let bonuses: Vec<Option<u64>> = (0..6)
        .map(|n| {
            engine
                .claim(&mut ledger, id, "u", window(n))
                .unwrap()
                .into_completed()
                .unwrap()
                .triple_bonus
        })
        .collect();

    assert_eq!(bonuses, vec![None, None, Some(50), None, None, Some(50)]);
    assert_eq!(ledger.card_count(id, "Bronze Knight").unwrap(), 6);
    assert_eq!(ledger.get_user(id).unwrap().unwrap().experience, 6 * 10 + 2 * 50);
}

/// The bonus amount follows the drawn card's tier.
#[test]
fn test_triple_bonus_uses_card_tier() {
    let cat = catalog();
    let config = only(Rarity::Epic);
    let mut engine = RewardEngine::new(&cat, &config, SequenceRng::constant(0.0)).unwrap();
    let mut ledger = MemoryLedger::new();
    let id = returning_user(&mut ledger, 1, &["Storm Mage", "Storm Mage"]);

    let result = engine.claim(&mut ledger, id, "u", t0()).unwrap().into_completed().unwrap();

    assert_eq!(result.owned_count, 3);
    assert_eq!(result.triple_bonus, Some(300));
    assert_eq!(result.base_experience, 50);
    assert_eq!(result.experience_gained, 350);
}

// =============================================================================
// Atomicity
// =============================================================================

/// A storage failure mid-claim leaves the ledger untouched, and the user
/// can claim again once storage recovers.
#[test]
fn test_storage_failure_rolls_back_claim() {
    init_tracing();
    let cat = catalog();
    let config = only(Rarity::Common);
    let mut engine = RewardEngine::new(&cat, &config, SequenceRng::constant(0.0)).unwrap();
    let mut ledger = MemoryLedger::new();
    let id = UserId::new(1);
    ledger.create_user(id, "u").unwrap();
    let before = ledger.clone();

    // The drawn card is written, the first-claim bonus write fails
    ledger.inject_outage_after(1);
    let err = engine.claim(&mut ledger, id, "u", t0()).unwrap_err();

    assert!(matches!(err, EngineError::Ledger(LedgerError::Unavailable(_))));
    assert!(ledger.same_contents(&before));
    assert_eq!(ledger.get_user(id).unwrap().unwrap().last_claim, None);

    ledger.clear_outage();
    let outcome = engine.claim(&mut ledger, id, "u", t0()).unwrap();
    assert_eq!(outcome.state(), ClaimState::Complete);
    assert_eq!(ledger.total_cards(id).unwrap(), 2);
}
