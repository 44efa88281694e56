//! Card catalog: validated, immutable card definitions.
//!
//! The `CardCatalog` is built once at startup from a record set and then only
//! read. It is passed by reference into the selector and the engines and
//! lives for the whole process.
//!
//! Loading fails eagerly with a `CatalogError` when:
//! - a media file is not `.gif`/`.mp4`, or is missing from the asset store
//! - a rarity is not one of the five tiers
//! - a name is duplicated, or there are no cards
//! - a populated tier upgrades into a tier with no cards

use std::collections::BTreeMap;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::definition::{CardDefinition, CardView, MediaRef};
use super::media::{is_supported_format, DirMediaStore, MediaStore};
use crate::core::{Rarity, RarityTable};
use crate::error::CatalogError;

/// One unvalidated catalog entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogRecord {
    pub name: String,
    pub rarity: String,
    pub description: String,
    pub media: String,
}

impl CatalogRecord {
    /// Create a record.
    pub fn new(
        name: impl Into<String>,
        rarity: impl Into<String>,
        description: impl Into<String>,
        media: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            rarity: rarity.into(),
            description: description.into(),
            media: media.into(),
        }
    }
}

impl From<&CardDefinition> for CatalogRecord {
    fn from(card: &CardDefinition) -> Self {
        Self::new(
            card.name.clone(),
            card.rarity.as_str(),
            card.description.clone(),
            card.media.as_str(),
        )
    }
}

/// Value side of the `cards.json` map.
#[derive(Debug, Deserialize, Serialize)]
struct JsonCard {
    rarity: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image: String,
}

/// Parse a `cards.json` document: an object mapping card name to
/// `{ "rarity", "description", "image" }`. Records come back in name order.
pub fn parse_catalog_json(json: &str) -> Result<Vec<CatalogRecord>, CatalogError> {
    let raw: BTreeMap<String, JsonCard> = serde_json::from_str(json)?;
    Ok(raw
        .into_iter()
        .map(|(name, card)| CatalogRecord::new(name, card.rarity, card.description, card.image))
        .collect())
}

/// Immutable table of card definitions.
///
/// ## Example
///
/// ```
/// use card_drop::cards::{CardCatalog, CatalogRecord, MemoryMediaStore};
/// use card_drop::core::Rarity;
///
/// let media: MemoryMediaStore = ["relic.gif"].into_iter().collect();
/// let catalog = CardCatalog::load(
///     vec![CatalogRecord::new("Old Relic", "artifact", "Hums softly.", "relic.gif")],
///     &media,
/// )
/// .unwrap();
///
/// assert_eq!(catalog.lookup("Old Relic").unwrap().rarity, Rarity::Artifact);
/// assert!(catalog.lookup("old relic").is_none());
/// ```
#[derive(Clone, Debug)]
pub struct CardCatalog {
    cards: Vec<CardDefinition>,
    by_name: FxHashMap<String, usize>,
    by_rarity: [Vec<usize>; 5],
}

impl CardCatalog {
    /// Validate `records` against `media` and build the catalog.
    pub fn load<I, M>(records: I, media: &M) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = CatalogRecord>,
        M: MediaStore + ?Sized,
    {
        let mut catalog = Self {
            cards: Vec::new(),
            by_name: FxHashMap::default(),
            by_rarity: Default::default(),
        };

        for record in records {
            let card = validate_record(record, media)?;
            if catalog.by_name.contains_key(&card.name) {
                return Err(CatalogError::DuplicateCard(card.name));
            }
            let idx = catalog.cards.len();
            catalog.by_name.insert(card.name.clone(), idx);
            catalog.by_rarity[card.rarity.index()].push(idx);
            catalog.cards.push(card);
        }

        if catalog.cards.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }
        catalog.check_upgrade_targets()?;
        catalog.log_distribution();

        Ok(catalog)
    }

    /// Build from already-typed definitions, still validating media.
    pub fn from_definitions<I, M>(cards: I, media: &M) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = CardDefinition>,
        M: MediaStore + ?Sized,
    {
        Self::load(cards.into_iter().map(|c| CatalogRecord::from(&c)), media)
    }

    /// Parse a `cards.json` document and validate it against `media`.
    pub fn from_json_str<M>(json: &str, media: &M) -> Result<Self, CatalogError>
    where
        M: MediaStore + ?Sized,
    {
        Self::load(parse_catalog_json(json)?, media)
    }

    /// Read `cards.json` from disk and validate media files in `media_dir`.
    pub fn from_json_path(
        json_path: impl AsRef<Path>,
        media_dir: impl AsRef<Path>,
    ) -> Result<Self, CatalogError> {
        let json_path = json_path.as_ref();
        let json = std::fs::read_to_string(json_path).map_err(|source| CatalogError::Io {
            path: json_path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json, &DirMediaStore::new(media_dir.as_ref()))
    }

    /// Find a card by exact name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&CardDefinition> {
        self.by_name.get(name).map(|&idx| &self.cards[idx])
    }

    /// Check if a card name is defined.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// All cards of a tier, in load order.
    pub fn all_of_rarity(&self, tier: Rarity) -> impl ExactSizeIterator<Item = &CardDefinition> {
        self.by_rarity[tier.index()].iter().map(move |&idx| &self.cards[idx])
    }

    /// Number of cards in a tier.
    #[must_use]
    pub fn count_of_rarity(&self, tier: Rarity) -> usize {
        self.by_rarity[tier.index()].len()
    }

    /// The `n`th card of a tier, in load order.
    #[must_use]
    pub fn nth_of_rarity(&self, tier: Rarity, n: usize) -> Option<&CardDefinition> {
        self.by_rarity[tier.index()].get(n).map(|&idx| &self.cards[idx])
    }

    /// The `n`th card overall, in load order.
    #[must_use]
    pub fn nth(&self, n: usize) -> Option<&CardDefinition> {
        self.cards.get(n)
    }

    /// Card at `index` modulo the catalog size.
    ///
    /// A loaded catalog is never empty, so this always yields a card.
    #[must_use]
    pub fn card_at(&self, index: usize) -> &CardDefinition {
        &self.cards[index % self.cards.len()]
    }

    /// Iterate over all cards in load order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &CardDefinition> {
        self.cards.iter()
    }

    /// Number of cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Always false for a loaded catalog.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Presentation view of a card with its media path resolved.
    #[must_use]
    pub fn view(&self, name: &str, media_root: &Path, rarities: &RarityTable) -> Option<CardView> {
        self.lookup(name).map(|card| card.view(media_root, rarities))
    }

    fn check_upgrade_targets(&self) -> Result<(), CatalogError> {
        for from in Rarity::ALL {
            let Some(to) = from.successor() else { continue };
            if self.count_of_rarity(from) > 0 && self.count_of_rarity(to) == 0 {
                return Err(CatalogError::MissingUpgradeTarget { from, to });
            }
        }
        Ok(())
    }

    fn log_distribution(&self) {
        for tier in Rarity::ALL {
            let names: Vec<&str> = self.all_of_rarity(tier).map(|c| c.name.as_str()).collect();
            if names.is_empty() {
                continue;
            }
            info!(rarity = %tier, count = names.len(), cards = %names.join(", "), "catalog tier loaded");
        }
    }
}

fn validate_record<M>(record: CatalogRecord, media: &M) -> Result<CardDefinition, CatalogError>
where
    M: MediaStore + ?Sized,
{
    let media_ref = MediaRef::new(record.media);

    if !is_supported_format(&media_ref) {
        return Err(CatalogError::UnsupportedMedia {
            card: record.name,
            file: media_ref.0,
        });
    }
    if !media.contains(&media_ref) {
        return Err(CatalogError::MissingMedia {
            card: record.name,
            file: media_ref.0,
        });
    }
    let Some(rarity) = Rarity::parse(&record.rarity) else {
        return Err(CatalogError::UnknownRarity {
            card: record.name,
            rarity: record.rarity,
        });
    };

    Ok(CardDefinition {
        name: record.name,
        rarity,
        description: record.description,
        media: media_ref,
    })
}
