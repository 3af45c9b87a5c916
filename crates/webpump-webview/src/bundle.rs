//! zstd-compressed snapshot of a site directory.
//!
//! Keys are paths relative to the snapshot root, joined with `/` on every
//! platform, so a bundle built on Windows serves the same URLs elsewhere.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;
use webpump_common::BundleError;

/// Release builds trade compile time for a smaller standalone.
const COMPRESSION_LEVEL: i32 = if cfg!(debug_assertions) { 1 } else { 19 };

/// Compressed files keyed by their `/`-separated path below the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedAssets {
    files: BTreeMap<String, Vec<u8>>,
}

impl EmbeddedAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compress every file below `root`, following symlinks.
    pub fn from_dir(root: &Path) -> Result<Self, BundleError> {
        let mut assets = Self::new();
        for entry in WalkDir::new(root).follow_links(true) {
            let entry = entry.map_err(|e| BundleError::Walk {
                path: root.to_path_buf(),
                source: e.into(),
            })?;
            if entry.file_type().is_dir() {
                continue;
            }
            let Some(key) = asset_key(root, entry.path()) else {
                warn!(path = %entry.path().display(), "skipping asset with unusable name");
                continue;
            };
            assets.insert_file(key, entry.path())?;
        }
        debug!(root = %root.display(), files = assets.len(), "site embedded");
        Ok(assets)
    }

    /// Compress `data` and store it under `key`.
    pub fn insert(&mut self, key: &str, data: &[u8]) -> Result<(), BundleError> {
        let compressed = zstd::encode_all(data, COMPRESSION_LEVEL)?;
        self.files.insert(normalize_key(key).to_string(), compressed);
        Ok(())
    }

    fn insert_file(&mut self, key: String, path: &Path) -> Result<(), BundleError> {
        let read_error = |source| BundleError::AssetRead {
            path: path.to_path_buf(),
            source,
        };
        let reader = File::open(path).map(BufReader::new).map_err(read_error)?;
        let compressed = zstd::encode_all(reader, COMPRESSION_LEVEL).map_err(read_error)?;
        self.files.insert(key, compressed);
        Ok(())
    }

    /// Decompressed contents of `key`, if present.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let compressed = self.files.get(normalize_key(key))?;
        match zstd::decode_all(compressed.as_slice()) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(key, "embedded asset failed to decompress: {e}");
                None
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.files.contains_key(normalize_key(key))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn normalize_key(key: &str) -> &str {
    key.trim_start_matches('/')
}

/// `/`-joined path of `path` relative to `root`, or `None` when a component
/// is not plain UTF-8.
fn asset_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts = relative
        .components()
        .map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    (!parts.is_empty()).then(|| parts.join("/"))
}
