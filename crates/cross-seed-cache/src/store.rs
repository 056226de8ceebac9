//! On-disk content-addressed torrent store.

use std::path::{Path, PathBuf};

use cross_seed_model::Metafile;
use tracing::warn;

use crate::error::{CacheError, CacheResult};

/// Collaborator that turns cached bencoded bytes into a `Metafile`.
///
/// Torrent-file parsing and bencode I/O are out of scope for this crate; the
/// cache only needs to know how to ask for a parse and how to react when one
/// fails.
pub trait MetafileParser: Send + Sync {
    /// Parse raw torrent bytes into a `Metafile`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a well-formed torrent.
    fn parse(&self, bytes: &[u8]) -> Result<Metafile, Box<dyn std::error::Error + Send + Sync>>;
}

fn file_name_for(info_hash: &str) -> String {
    format!("{info_hash}.cached.torrent")
}

/// Content-addressed on-disk store for snatched `.torrent` files, keyed by
/// info-hash at `<root>/{infoHash}.cached.torrent`.
#[derive(Debug, Clone)]
pub struct TorrentCache {
    root: PathBuf,
}

impl TorrentCache {
    /// Open (creating if necessary) a torrent cache rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> CacheResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|source| CacheError::Io {
                operation: "create_dir_all",
                path: root.clone(),
                source,
            })?;
        Ok(Self { root })
    }

    /// Path a given info-hash would be cached at, regardless of whether it
    /// currently exists.
    #[must_use]
    pub fn path_for(&self, info_hash: &str) -> PathBuf {
        self.root.join(file_name_for(info_hash))
    }

    /// Whether a cache entry exists for `info_hash`.
    #[must_use]
    pub fn contains(&self, info_hash: &str) -> bool {
        self.path_for(info_hash).is_file()
    }

    /// Write `bytes` into the cache under `info_hash`, overwriting any
    /// existing entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn store(&self, info_hash: &str, bytes: &[u8]) -> CacheResult<()> {
        let path = self.path_for(info_hash);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| CacheError::Io {
                operation: "write",
                path,
                source,
            })
    }

    /// Load the raw bytes for `info_hash`, touching the file's modification
    /// time so the cleanup job can tell recently-read entries from stale
    /// ones. Returns `Ok(None)` on a cache miss rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub async fn load_bytes(&self, info_hash: &str) -> CacheResult<Option<Vec<u8>>> {
        let path = self.path_for(info_hash);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                touch(&path).await;
                Ok(Some(bytes))
            }
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CacheError::Io {
                operation: "read",
                path,
                source,
            }),
        }
    }

    /// Load and parse the cached entry for `info_hash`.
    ///
    /// On a parse failure, the corrupt file is evicted best-effort (see
    /// [`Self::evict_corrupt`]) and the parse error is still returned to the
    /// caller unchanged — eviction never masks the underlying failure.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] on read failure or [`CacheError::Corrupt`]
    /// if the cached bytes fail to parse.
    pub async fn load_parsed(
        &self,
        info_hash: &str,
        parser: &dyn MetafileParser,
    ) -> CacheResult<Option<Metafile>> {
        let Some(bytes) = self.load_bytes(info_hash).await? else {
            return Ok(None);
        };
        match parser.parse(&bytes) {
            Ok(metafile) => Ok(Some(metafile)),
            Err(source) => {
                self.evict_corrupt(info_hash).await;
                Err(CacheError::Corrupt {
                    info_hash: info_hash.to_string(),
                    source,
                })
            }
        }
    }

    /// Best-effort removal of a corrupt cache entry. Failure to unlink is
    /// logged, never surfaced as an error, so it can never mask the parse
    /// failure that triggered the eviction.
    pub async fn evict_corrupt(&self, info_hash: &str) {
        let path = self.path_for(info_hash);
        if let Err(err) = tokio::fs::remove_file(&path).await
            && path.exists()
        {
            warn!(
                info_hash = %info_hash,
                path = %path.display(),
                error = %err,
                "failed to unlink corrupt cached torrent"
            );
        }
    }

    /// Enumerate info-hashes currently present in the cache, for the
    /// cleanup job to reconcile against the decision table.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache directory cannot be listed.
    pub async fn list_cached_hashes(&self) -> CacheResult<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|source| CacheError::Io {
                operation: "read_dir",
                path: self.root.clone(),
                source,
            })?;
        let mut hashes = Vec::new();
        loop {
            let next = entries.next_entry().await.map_err(|source| CacheError::Io {
                operation: "read_dir_entry",
                path: self.root.clone(),
                source,
            })?;
            let Some(entry) = next else { break };
            if let Some(hash) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.strip_suffix(".cached.torrent"))
            {
                hashes.push(hash.to_string());
            }
        }
        Ok(hashes)
    }

    /// Remove a cache entry outright, for the cleanup job's reconciliation
    /// pass. Missing files are treated as already-removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub async fn remove(&self, info_hash: &str) -> CacheResult<()> {
        let path = self.path_for(info_hash);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(_) if !path.exists() => Ok(()),
            Err(source) => Err(CacheError::Io {
                operation: "remove",
                path,
                source,
            }),
        }
    }
}

async fn touch(path: &Path) {
    if let Ok(bytes) = tokio::fs::read(path).await {
        let _ = tokio::fs::write(path, bytes).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cross_seed_model::{MetafileFile, Privacy};

    struct StubParser {
        should_fail: bool,
    }

    impl MetafileParser for StubParser {
        fn parse(
            &self,
            bytes: &[u8],
        ) -> Result<Metafile, Box<dyn std::error::Error + Send + Sync>> {
            if self.should_fail {
                return Err("malformed bencode".into());
            }
            Ok(Metafile {
                info_hash: String::from_utf8_lossy(bytes).to_string(),
                length: 10,
                piece_length: 10,
                name: "stub".to_string(),
                files: vec![MetafileFile::new("stub/a", 10)],
                trackers: vec![],
                private: Privacy::Unknown,
            })
        }
    }

    #[tokio::test]
    async fn store_then_load_round_trips_bytes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = TorrentCache::open(dir.path()).await.expect("open");
        let hash = "a".repeat(40);
        cache.store(&hash, b"payload").await.expect("store");
        assert!(cache.contains(&hash));
        let loaded = cache.load_bytes(&hash).await.expect("load");
        assert_eq!(loaded, Some(b"payload".to_vec()));
    }

    #[tokio::test]
    async fn load_bytes_miss_returns_none_not_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = TorrentCache::open(dir.path()).await.expect("open");
        let loaded = cache.load_bytes(&"b".repeat(40)).await.expect("load");
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn corrupt_parse_evicts_file_but_still_returns_the_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = TorrentCache::open(dir.path()).await.expect("open");
        let hash = "c".repeat(40);
        cache.store(&hash, b"garbage").await.expect("store");

        let parser = StubParser { should_fail: true };
        let result = cache.load_parsed(&hash, &parser).await;
        assert!(matches!(result, Err(CacheError::Corrupt { .. })));
        assert!(!cache.contains(&hash), "corrupt entry should be evicted");
    }

    #[tokio::test]
    async fn list_cached_hashes_strips_suffix() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = TorrentCache::open(dir.path()).await.expect("open");
        let hash = "d".repeat(40);
        cache.store(&hash, b"x").await.expect("store");
        let hashes = cache.list_cached_hashes().await.expect("list");
        assert_eq!(hashes, vec![hash]);
    }

    #[tokio::test]
    async fn remove_is_idempotent_on_missing_entries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = TorrentCache::open(dir.path()).await.expect("open");
        cache.remove(&"e".repeat(40)).await.expect("remove missing");
    }
}
