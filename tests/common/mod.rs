//! Shared fixtures for integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};

use card_drop::cards::{CardCatalog, CatalogRecord, MemoryMediaStore};
use card_drop::core::UserId;
use card_drop::ledger::{LedgerStore, MemoryLedger};

/// Seven cards covering every tier. Tier order inside the catalog follows
/// record order.
pub fn records() -> Vec<CatalogRecord> {
    vec![
        CatalogRecord::new("Bronze Knight", "common", "Shiny, if a little dented.", "bronze_knight.gif"),
        CatalogRecord::new("Slime", "common", "Wobbles.", "slime.gif"),
        CatalogRecord::new("Iron Golem", "rare", "Slow but sure.", "iron_golem.gif"),
        CatalogRecord::new("Silver Archer", "rare", "Never misses twice.", "silver_archer.mp4"),
        CatalogRecord::new("Storm Mage", "epic", "Crackles.", "storm_mage.gif"),
        CatalogRecord::new("Golden Dragon", "legendary", "Hoards everything.", "golden_dragon.mp4"),
        CatalogRecord::new("Old Relic", "artifact", "Hums softly.", "old_relic.gif"),
    ]
}

pub fn catalog() -> CardCatalog {
    let records = records();
    let media: MemoryMediaStore = records.iter().map(|r| r.media.clone()).collect();
    CardCatalog::load(records, &media).unwrap()
}

/// Route engine logs to the test writer. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// Claim time `n` cooldown windows after `t0`.
pub fn window(n: i64) -> DateTime<Utc> {
    t0() + Duration::hours(2 * n)
}

/// A user who has claimed before (no first-claim bonus) and owns `cards`.
pub fn returning_user(ledger: &mut MemoryLedger, id: i64, cards: &[&str]) -> UserId {
    let id = UserId::new(id);
    ledger.create_user(id, &format!("user{}", id.raw())).unwrap();
    ledger.update_last_claim(id, t0() - Duration::days(1)).unwrap();
    for card in cards {
        ledger.add_card(id, card).unwrap();
    }
    id
}
