//! Card definitions - static card data.
//!
//! `CardDefinition` holds the immutable properties of a collectible card:
//! its name, tier, flavour text and the media asset shown when it drops.
//!
//! Anything derived at lookup time (resolved media path, experience value)
//! goes into a separate `CardView` instead of being attached to the
//! definition.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{Rarity, RarityTable};

/// Reference to a media asset, as written in the catalog (a file name).
///
/// The engine never opens the asset; it only validates that it exists and
/// hands the reference to the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaRef(pub String);

impl MediaRef {
    /// Create a media reference.
    #[must_use]
    pub fn new(file: impl Into<String>) -> Self {
        Self(file.into())
    }

    /// The referenced file name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased file extension including the dot, e.g. `".gif"`.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.0)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
    }

    /// Full path of the asset under `media_root`.
    #[must_use]
    pub fn resolve(&self, media_root: &Path) -> PathBuf {
        media_root.join(&self.0)
    }
}

impl std::fmt::Display for MediaRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use card_drop::cards::CardDefinition;
/// use card_drop::core::Rarity;
///
/// let knight = CardDefinition::new("Bronze Knight", Rarity::Common)
///     .with_description("Shiny, if a little dented.")
///     .with_media("bronze_knight.gif");
///
/// assert_eq!(knight.rarity, Rarity::Common);
/// assert_eq!(knight.media.as_str(), "bronze_knight.gif");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Unique card name. Lookups are exact.
    pub name: String,

    /// Rarity tier.
    pub rarity: Rarity,

    /// Flavour text.
    pub description: String,

    /// Animated media asset.
    pub media: MediaRef,
}

impl CardDefinition {
    /// Create a card with empty description and media.
    #[must_use]
    pub fn new(name: impl Into<String>, rarity: Rarity) -> Self {
        Self {
            name: name.into(),
            rarity,
            description: String::new(),
            media: MediaRef::new(""),
        }
    }

    /// Set the description (builder pattern).
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the media reference (builder pattern).
    #[must_use]
    pub fn with_media(mut self, file: impl Into<String>) -> Self {
        self.media = MediaRef::new(file);
        self
    }

    /// Presentation view with the media path resolved under `media_root`.
    #[must_use]
    pub fn view(&self, media_root: &Path, rarities: &RarityTable) -> CardView {
        CardView {
            name: self.name.clone(),
            rarity: self.rarity,
            description: self.description.clone(),
            media_path: self.media.resolve(media_root),
            experience: rarities.experience(self.rarity),
        }
    }
}

/// Card data prepared for the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub name: String,
    pub rarity: Rarity,
    pub description: String,
    pub media_path: PathBuf,
    /// Base experience a claim of this card is worth.
    pub experience: u64,
}
