use std::{
    collections::HashMap,
    fs,
    io::Write,
    path::{
        Path,
        PathBuf,
    },
    sync::{
        atomic::{
            AtomicU64,
            Ordering,
        },
        Mutex,
    },
};

use sha2::{
    Digest,
    Sha256,
};
use tempfile::NamedTempFile;

use super::{
    MediaAsset,
    MediaKind,
};
use crate::core::WortkartenError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Durable content-addressed store for generated media. Assets live as plain
/// files under `<root>/audio` and `<root>/images`, named by their cache key,
/// so a fresh process resolves the same keys to the same files.
#[derive(Debug)]
pub struct MediaCache {
    root: PathBuf,
    index: Mutex<HashMap<(MediaKind, String), PathBuf>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MediaCache {
    /// Open the store at its default location under the app data dir.
    pub fn open_default() -> Result<Self, WortkartenError> {
        Self::open(crate::persistence::default_media_dir())
    }

    /// Open (or create) the store at `root` and rebuild the in-memory index
    /// from whatever is already on disk.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, WortkartenError> {
        let root = root.into();
        let mut index = HashMap::new();

        for kind in [MediaKind::Audio, MediaKind::Image] {
            let dir = root.join(kind.subdir());
            fs::create_dir_all(&dir)
                .map_err(|e| WortkartenError::storage(&dir, format!("create failed: {}", e)))?;

            for entry in fs::read_dir(&dir)
                .map_err(|e| WortkartenError::storage(&dir, format!("read failed: {}", e)))?
            {
                let path = entry
                    .map_err(|e| WortkartenError::storage(&dir, format!("read failed: {}", e)))?
                    .path();
                if !path.is_file() {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    index.insert((kind, stem.to_string()), path.clone());
                }
            }
        }

        if !index.is_empty() {
            println!("Media cache: indexed {} existing assets at {}", index.len(), root.display());
        }

        Ok(Self {
            root,
            index: Mutex::new(index),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    /// Generation key for spoken text: a digest of the exact text, so two
    /// records sharing an example sentence resolve to one stored asset.
    pub fn audio_key(text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Generation key for an image search term: case-folded and
    /// whitespace-normalized, kept filename-safe.
    pub fn image_key(term: &str) -> String {
        term.trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '-' })
            .collect()
    }

    pub fn lookup(&self, kind: MediaKind, key: &str) -> Option<MediaAsset> {
        let index = self.index.lock().expect("media cache index poisoned");
        match index.get(&(kind, key.to_string())) {
            Some(path) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(MediaAsset { kind, cache_key: key.to_string(), storage_path: path.clone() })
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Idempotent store: when the key is already present the existing asset is
    /// returned untouched. New assets are written to a temp file and renamed
    /// into place, so a reader never sees a partial file.
    pub fn store(
        &self,
        kind: MediaKind,
        key: &str,
        bytes: &[u8],
    ) -> Result<MediaAsset, WortkartenError> {
        {
            let index = self.index.lock().expect("media cache index poisoned");
            if let Some(path) = index.get(&(kind, key.to_string())) {
                return Ok(MediaAsset {
                    kind,
                    cache_key: key.to_string(),
                    storage_path: path.clone(),
                });
            }
        }

        let dir = self.root.join(kind.subdir());
        let final_path = dir.join(format!("{}.{}", key, kind.extension()));

        let mut tmp = NamedTempFile::new_in(&dir)
            .map_err(|e| WortkartenError::storage(&dir, format!("temp file failed: {}", e)))?;
        tmp.write_all(bytes)
            .map_err(|e| WortkartenError::storage(&final_path, format!("write failed: {}", e)))?;
        tmp.persist(&final_path)
            .map_err(|e| WortkartenError::storage(&final_path, format!("rename failed: {}", e)))?;

        let mut index = self.index.lock().expect("media cache index poisoned");
        index.insert((kind, key.to_string()), final_path.clone());

        Ok(MediaAsset { kind, cache_key: key.to_string(), storage_path: final_path })
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_key_is_stable_and_text_sensitive() {
        let a = MediaCache::audio_key("guten Tag");
        let b = MediaCache::audio_key("guten Tag");
        let c = MediaCache::audio_key("guten Morgen");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn image_key_folds_case_and_whitespace() {
        assert_eq!(MediaCache::image_key("  Guten   Tag "), "guten_tag");
        assert_eq!(MediaCache::image_key("Der Mann"), "der_mann");
        assert_eq!(MediaCache::image_key("a/b c"), "a-b_c");
    }

    #[test]
    fn store_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MediaCache::open(dir.path()).unwrap();

        let first = cache.store(MediaKind::Audio, "abc", b"one").unwrap();
        let second = cache.store(MediaKind::Audio, "abc", b"two").unwrap();

        assert_eq!(first, second);
        // First write wins; the second store never touches the file.
        assert_eq!(fs::read(&first.storage_path).unwrap(), b"one");
    }

    #[test]
    fn lookup_counts_hits_and_misses() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MediaCache::open(dir.path()).unwrap();

        assert!(cache.lookup(MediaKind::Image, "missing").is_none());
        cache.store(MediaKind::Image, "mann", b"img").unwrap();
        assert!(cache.lookup(MediaKind::Image, "mann").is_some());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn reopen_recovers_existing_assets() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let cache = MediaCache::open(dir.path()).unwrap();
            cache.store(MediaKind::Audio, "key1", b"bytes").unwrap().storage_path
        };

        let reopened = MediaCache::open(dir.path()).unwrap();
        let asset = reopened.lookup(MediaKind::Audio, "key1").expect("asset survives restart");
        assert_eq!(asset.storage_path, path);
    }
}
