use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Async key -> string blob store.
///
/// A single `set` is assumed atomic; there are no multi-key transactions.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-process store; also counts writes so callers can assert on them
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of `set` calls served so far
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.write().await.insert(key.to_string(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// One file per key under a directory.
///
/// Writes go to a temp file that is then renamed over the target, so a
/// crash mid-write leaves the previous value intact.
pub struct FileStore {
    dir: PathBuf,
    temp_counter: AtomicU64,
}

impl FileStore {
    /// The directory is created lazily on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            temp_counter: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(key)))
    }

    // Unique per write; overlapping writers must not share a temp file
    fn temp_path_for(&self, key: &str) -> PathBuf {
        let n = self.temp_counter.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!(
            "{}.json.{}-{}.tmp",
            file_stem(key),
            std::process::id(),
            n
        ))
    }
}

/// Map a store key to a portable file name (`movie-library:v1` ->
/// `movie-library_v1`)
fn file_stem(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Store miss: {} ({:?} does not exist)", key, path);
                Ok(None)
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(key);
        let temp_path = self.temp_path_for(key);
        tokio::fs::write(&temp_path, value.as_bytes()).await?;
        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StoreError::Io(e));
        }

        debug!("Store write: {} ({} bytes)", key, value.len());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::with_entries([("a", "1")]);
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("b").await.unwrap(), None);

        store.set("b", "2".to_string()).await.unwrap();
        assert_eq!(store.get("b").await.unwrap().as_deref(), Some("2"));
        assert_eq!(store.writes(), 1);

        store.remove("a").await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("store"));

        assert_eq!(store.get("movie-library:v1").await.unwrap(), None);

        store
            .set("movie-library:v1", r#"{"watchlist":[],"watched":[]}"#.to_string())
            .await
            .unwrap();
        assert_eq!(
            store.get("movie-library:v1").await.unwrap().as_deref(),
            Some(r#"{"watchlist":[],"watched":[]}"#)
        );

        let file = dir.path().join("store").join("movie-library_v1.json");
        assert!(file.exists());
        assert_eq!(temp_files(&dir.path().join("store")), 0);

        store.set("movie-library:v1", "{}".to_string()).await.unwrap();
        assert_eq!(store.get("movie-library:v1").await.unwrap().as_deref(), Some("{}"));

        store.remove("movie-library:v1").await.unwrap();
        assert_eq!(store.get("movie-library:v1").await.unwrap(), None);
        // Removing a missing key is not an error
        store.remove("movie-library:v1").await.unwrap();
    }

    fn temp_files(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter(|entry| {
                entry
                    .as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .ends_with(".tmp")
            })
            .count()
    }

    #[tokio::test]
    async fn test_file_store_overlapping_writes_to_one_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let writes = (0..8).map(|i| store.set("movie-library:v1", format!("{{\"n\":{}}}", i)));
        for result in futures::future::join_all(writes).await {
            result.unwrap();
        }

        let stored = store.get("movie-library:v1").await.unwrap().unwrap();
        assert!(stored.starts_with("{\"n\":"));
        assert_eq!(temp_files(dir.path()), 0);
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("movie-library:v1"), "movie-library_v1");
        assert_eq!(file_stem("watchlist:v1"), "watchlist_v1");
        assert_eq!(file_stem("../escape"), ".._escape");
    }
}
