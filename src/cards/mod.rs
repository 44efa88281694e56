//! Card system: definitions, media validation, and the catalog.
//!
//! ## Key Types
//!
//! - `CardDefinition`: Immutable card data (name, rarity, description, media)
//! - `CardView`: Presentation DTO with the media path resolved
//! - `MediaStore`: Where media assets are checked for existence
//! - `CardCatalog`: Validated, process-lifetime card table

pub mod definition;
pub mod media;
pub mod catalog;

pub use definition::{CardDefinition, CardView, MediaRef};
pub use media::{is_supported_format, DirMediaStore, MediaStore, MemoryMediaStore, ACCEPTED_MEDIA_EXTENSIONS};
pub use catalog::{parse_catalog_json, CardCatalog, CatalogRecord};
