//! Card upgrades: three identical cards become one card of the next tier.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cards::{CardCatalog, CardDefinition};
use crate::core::{RandomSource, UserId};
use crate::error::{EngineError, NotFound, Result};
use crate::ledger::LedgerStore;

/// Copies consumed by one upgrade.
pub const UPGRADE_COST: u32 = 3;

/// A completed upgrade.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeResult {
    pub user: UserId,

    /// Card whose copies were spent.
    pub consumed: CardDefinition,

    /// Copies of `consumed` still owned afterwards.
    pub consumed_remaining: u32,

    /// Card granted from the next tier.
    pub minted: CardDefinition,

    /// Owned count of `minted` afterwards.
    pub minted_count: u32,
}

/// Converts stacks of three into next-tier cards.
pub struct UpgradeEngine<'c, R> {
    catalog: &'c CardCatalog,
    rng: R,
}

impl<'c, R: RandomSource> UpgradeEngine<'c, R> {
    /// Create an upgrade engine over `catalog`.
    pub fn new(catalog: &'c CardCatalog, rng: R) -> Self {
        Self { catalog, rng }
    }

    /// Spend three copies of `card_name` for one random card of the next tier.
    ///
    /// Returns `Ok(None)` when the user holds fewer than three copies; the
    /// ledger is left untouched in that case.
    ///
    /// ## Errors
    ///
    /// - `NotFound` for an unknown card or user
    /// - `NotUpgradable` for artifact cards
    /// - `Configuration` if the next tier has no cards
    /// - `Ledger` if storage fails (nothing is applied)
    pub fn upgrade<L: LedgerStore>(
        &mut self,
        store: &mut L,
        user: UserId,
        card_name: &str,
    ) -> Result<Option<UpgradeResult>> {
        let catalog = self.catalog;
        let consumed = catalog
            .lookup(card_name)
            .ok_or_else(|| EngineError::NotFound(NotFound::Card(card_name.to_string())))?;

        let Some(target) = consumed.rarity.successor() else {
            return Err(EngineError::NotUpgradable {
                card: consumed.name.clone(),
                rarity: consumed.rarity,
            });
        };

        let candidates = catalog.count_of_rarity(target);
        if candidates == 0 {
            return Err(EngineError::Configuration(format!(
                "no {} cards to upgrade {} into",
                target, consumed.name
            )));
        }

        if store.get_user(user)?.is_none() {
            return Err(EngineError::NotFound(NotFound::User(user)));
        }

        let result = store.atomically(|tx| -> Result<Option<UpgradeResult>> {
            if !tx.take_cards(user, &consumed.name, UPGRADE_COST)? {
                return Ok(None);
            }

            let minted = catalog
                .nth_of_rarity(target, self.rng.pick_index(candidates))
                .ok_or_else(|| EngineError::Configuration(format!("{} tier shrank during upgrade", target)))?;
            let minted_count = tx.add_card(user, &minted.name)?;
            let consumed_remaining = tx.card_count(user, &consumed.name)?;

            Ok(Some(UpgradeResult {
                user,
                consumed: consumed.clone(),
                consumed_remaining,
                minted: minted.clone(),
                minted_count,
            }))
        })?;

        match &result {
            Some(done) => info!(
                %user,
                consumed = %done.consumed.name,
                minted = %done.minted.name,
                rarity = %done.minted.rarity,
                "upgrade complete"
            ),
            None => debug!(%user, card = %card_name, "upgrade refused, fewer than three copies"),
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CatalogRecord, MemoryMediaStore};
    use crate::core::{Rarity, SequenceRng};
    use crate::ledger::MemoryLedger;

    fn catalog() -> CardCatalog {
        let records = vec![
            CatalogRecord::new("Bronze Knight", "common", "", "knight.gif"),
            CatalogRecord::new("Silver Archer", "rare", "", "archer.gif"),
            CatalogRecord::new("Iron Golem", "rare", "", "golem.gif"),
            CatalogRecord::new("Storm Mage", "epic", "", "mage.gif"),
            CatalogRecord::new("Golden Dragon", "legendary", "", "dragon.gif"),
            CatalogRecord::new("Old Relic", "artifact", "", "relic.mp4"),
        ];
        let media: MemoryMediaStore = records.iter().map(|r| r.media.clone()).collect();
        CardCatalog::load(records, &media).unwrap()
    }

    fn ledger_with(card: &str, copies: u32) -> (MemoryLedger, UserId) {
        let mut ledger = MemoryLedger::new();
        let id = UserId::new(1);
        ledger.create_user(id, "u").unwrap();
        for _ in 0..copies {
            ledger.add_card(id, card).unwrap();
        }
        (ledger, id)
    }

    #[test]
    fn test_picks_within_successor_tier() {
        let cat = catalog();
        let (mut ledger, id) = ledger_with("Bronze Knight", 4);
        let mut engine = UpgradeEngine::new(&cat, SequenceRng::constant(0.75));

        let done = engine.upgrade(&mut ledger, id, "Bronze Knight").unwrap().unwrap();
        assert_eq!(done.minted.name, "Iron Golem");
        assert_eq!(done.minted.rarity, Rarity::Rare);
        assert_eq!(done.minted_count, 1);
        assert_eq!(done.consumed_remaining, 1);
    }

    #[test]
    fn test_artifact_not_upgradable() {
        let cat = catalog();
        let (mut ledger, id) = ledger_with("Old Relic", 3);
        let mut engine = UpgradeEngine::new(&cat, SequenceRng::constant(0.0));

        let err = engine.upgrade(&mut ledger, id, "Old Relic").unwrap_err();
        assert!(matches!(err, EngineError::NotUpgradable { rarity: Rarity::Artifact, .. }));
        assert_eq!(ledger.card_count(id, "Old Relic").unwrap(), 3);
    }

    #[test]
    fn test_unknown_card_and_user() {
        let cat = catalog();
        let (mut ledger, id) = ledger_with("Bronze Knight", 3);
        let mut engine = UpgradeEngine::new(&cat, SequenceRng::constant(0.0));

        let err = engine.upgrade(&mut ledger, id, "bronze knight").unwrap_err();
        assert!(matches!(err, EngineError::NotFound(NotFound::Card(_))));

        let err = engine.upgrade(&mut ledger, UserId::new(99), "Bronze Knight").unwrap_err();
        assert!(matches!(err, EngineError::NotFound(NotFound::User(_))));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_storage_failure_rolls_back() {
        let cat = catalog();
        let (mut ledger, id) = ledger_with("Bronze Knight", 3);
        let before = ledger.clone();
        // take_cards succeeds, add_card fails
        ledger.inject_outage_after(1);

        let mut engine = UpgradeEngine::new(&cat, SequenceRng::constant(0.0));
        let err = engine.upgrade(&mut ledger, id, "Bronze Knight").unwrap_err();

        assert!(matches!(err, EngineError::Ledger(_)));
        assert!(ledger.same_contents(&before));
    }
}
