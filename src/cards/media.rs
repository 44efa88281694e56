//! Media asset validation.
//!
//! Only animated formats are accepted: `.gif` and `.mp4`. Static images are
//! rejected at catalog load, as are assets missing from the store.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use super::definition::MediaRef;

/// Accepted media extensions (lowercase, with dot).
pub const ACCEPTED_MEDIA_EXTENSIONS: [&str; 2] = [".gif", ".mp4"];

/// Is the referenced file in one of the accepted animated formats?
#[must_use]
pub fn is_supported_format(media: &MediaRef) -> bool {
    media
        .extension()
        .is_some_and(|ext| ACCEPTED_MEDIA_EXTENSIONS.contains(&ext.as_str()))
}

/// Backing store of media assets.
pub trait MediaStore {
    /// Does the referenced asset exist?
    fn contains(&self, media: &MediaRef) -> bool;
}

/// Media assets stored as files in a directory.
#[derive(Clone, Debug)]
pub struct DirMediaStore {
    root: PathBuf,
}

impl DirMediaStore {
    /// Store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the assets.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl MediaStore for DirMediaStore {
    fn contains(&self, media: &MediaRef) -> bool {
        media.resolve(&self.root).is_file()
    }
}

/// In-memory set of asset names.
#[derive(Clone, Debug, Default)]
pub struct MemoryMediaStore {
    files: FxHashSet<String>,
}

impl MemoryMediaStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an asset name.
    pub fn insert(&mut self, file: impl Into<String>) {
        self.files.insert(file.into());
    }
}

impl<S: Into<String>> FromIterator<S> for MemoryMediaStore {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl MediaStore for MemoryMediaStore {
    fn contains(&self, media: &MediaRef) -> bool {
        self.files.contains(media.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_formats() {
        assert!(is_supported_format(&MediaRef::new("a.gif")));
        assert!(is_supported_format(&MediaRef::new("a.mp4")));
        assert!(is_supported_format(&MediaRef::new("A.GIF")));
        assert!(!is_supported_format(&MediaRef::new("a.png")));
        assert!(!is_supported_format(&MediaRef::new("a.jpg")));
        assert!(!is_supported_format(&MediaRef::new("a.webm")));
        assert!(!is_supported_format(&MediaRef::new("gif")));
    }

    #[test]
    fn test_memory_store() {
        let store: MemoryMediaStore = ["a.gif", "b.mp4"].into_iter().collect();
        assert!(store.contains(&MediaRef::new("a.gif")));
        assert!(!store.contains(&MediaRef::new("c.gif")));
    }

    #[test]
    fn test_dir_store() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("present.gif"), b"GIF89a").unwrap();
        std::fs::create_dir(dir.path().join("folder.gif")).unwrap();

        let store = DirMediaStore::new(dir.path());
        assert!(store.contains(&MediaRef::new("present.gif")));
        assert!(!store.contains(&MediaRef::new("absent.gif")));
        assert!(!store.contains(&MediaRef::new("folder.gif")));
        assert_eq!(store.root(), dir.path());
    }
}
