use anyhow::Result;
use movie_library_config::{Config, PathManager};
use movie_library_models::{LibraryState, Membership, MovieRef, UserRating};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use crate::clock::{Clock, SystemClock};
use crate::codec::{self, Decoded};
use crate::migration::{self, MigrationOutcome, SkipReason};
use crate::mutation;
use crate::store::{FileStore, KeyValueStore};

/// Store key of the combined library record
pub const LIBRARY_KEY: &str = "movie-library:v1";

/// Owns the persisted library and is its only writer.
///
/// Every operation reads the full record, applies one transition and writes
/// the full record back. Mutations on one manager are serialized, so rapid
/// concurrent calls cannot lose updates. Two managers over the same store do
/// not share that lock.
///
/// Storage failures never reach the caller: malformed data reads as an
/// empty library and failed writes are logged. When the store itself cannot
/// be read, operations work on an empty library and write nothing, so a
/// transient read error cannot overwrite the stored record.
pub struct LibraryManager<S: KeyValueStore + ?Sized> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl LibraryManager<FileStore> {
    /// Open the file-backed library described by the config
    pub fn open(config: &Config, paths: &PathManager) -> Result<Self> {
        let dir = paths.store_dir(&config.storage.store_dir);
        std::fs::create_dir_all(&dir)?;
        info!("Opening movie library at {:?}", dir);
        Ok(Self::new(Arc::new(FileStore::new(dir))))
    }
}

impl<S: KeyValueStore + ?Sized> LibraryManager<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    async fn read_decoded(&self) -> Decoded {
        match self.store.get(LIBRARY_KEY).await {
            Ok(raw) => codec::decode(raw.as_deref()),
            Err(e) => {
                warn!("Could not read library, changes will not be saved: {}", e);
                Decoded::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn read(&self) -> LibraryState {
        self.read_decoded().await.into_state()
    }

    /// Read for a mutation. The flag is false when the read failed; the
    /// stored record is then left untouched.
    async fn read_for_update(&self) -> (LibraryState, bool) {
        let decoded = self.read_decoded().await;
        let writable = decoded.is_writable();
        (decoded.into_state(), writable)
    }

    async fn write(&self, state: &LibraryState) {
        let encoded = match codec::encode(state) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Could not encode library, not saved: {}", e);
                return;
            }
        };

        if let Err(e) = self.store.set(LIBRARY_KEY, encoded).await {
            warn!("Could not save library: {}", e);
        } else {
            debug!(
                "Saved library: {} on watchlist, {} watched",
                state.watchlist.len(),
                state.watched.len()
            );
        }
    }

    /// Current library, verbatim
    pub async fn get_library(&self) -> LibraryState {
        self.read().await
    }

    /// Current library along with how it was decoded
    pub async fn inspect(&self) -> Decoded {
        self.read_decoded().await
    }

    pub async fn membership(&self, id: &str) -> Membership {
        self.read().await.membership(id)
    }

    /// Import the legacy single-list watchlist if the library is still empty.
    ///
    /// Safe to call on every startup; once the library has any entry this
    /// is a no-op forever.
    pub async fn migrate_if_needed(&self) -> (LibraryState, MigrationOutcome) {
        let _guard = self.write_lock.lock().await;
        let (current, writable) = self.read_for_update().await;
        if !writable {
            return (current, MigrationOutcome::Skipped(SkipReason::LibraryUnreadable));
        }

        let outcome = migration::plan_migration(self.store.as_ref(), &current).await;
        let state = match &outcome {
            MigrationOutcome::Migrated { state, .. } => {
                self.write(state).await;
                state.clone()
            }
            _ => current,
        };
        (state, outcome)
    }

    /// Startup sequence: migrate if needed, then read the library
    pub async fn load(&self) -> LibraryState {
        let (_, outcome) = self.migrate_if_needed().await;
        debug!("Migration check: {}", outcome_label(&outcome));
        self.get_library().await
    }

    /// Put a movie at the top of the watchlist, taking it off the watched
    /// list if needed. Adding a movie that is already listed changes
    /// nothing and writes nothing.
    pub async fn add_to_watchlist(&self, movie: MovieRef) -> LibraryState {
        let _guard = self.write_lock.lock().await;
        let (mut state, writable) = self.read_for_update().await;
        if mutation::add_to_watchlist(&mut state, movie) && writable {
            self.write(&state).await;
        }
        state
    }

    /// Remove a movie from the watchlist; always writes, even if absent
    pub async fn remove_from_watchlist(&self, id: &str) -> LibraryState {
        let _guard = self.write_lock.lock().await;
        let (mut state, writable) = self.read_for_update().await;
        mutation::remove_from_watchlist(&mut state, id);
        if writable {
            self.write(&state).await;
        }
        state
    }

    /// The detail screen's save button: remove if listed, otherwise add
    pub async fn toggle_watchlist(&self, movie: MovieRef) -> LibraryState {
        let _guard = self.write_lock.lock().await;
        let (mut state, writable) = self.read_for_update().await;
        let changed = if state.contains_watchlist(&movie.id) {
            mutation::remove_from_watchlist(&mut state, &movie.id)
        } else {
            mutation::add_to_watchlist(&mut state, movie)
        };
        if changed && writable {
            self.write(&state).await;
        }
        state
    }

    /// Move a movie to the top of the watched list. Repeat calls keep the
    /// original timestamp and rating.
    pub async fn mark_watched(&self, movie: MovieRef, rating: Option<UserRating>) -> LibraryState {
        let _guard = self.write_lock.lock().await;
        let (mut state, writable) = self.read_for_update().await;
        if mutation::mark_watched(&mut state, movie, self.clock.now(), rating) && writable {
            self.write(&state).await;
        }
        state
    }

    /// Move a watched movie back to the watchlist; always writes
    pub async fn unwatch(&self, id: &str) -> LibraryState {
        let _guard = self.write_lock.lock().await;
        let (mut state, writable) = self.read_for_update().await;
        mutation::unwatch(&mut state, id);
        if writable {
            self.write(&state).await;
        }
        state
    }

    /// Delete the library record. Maintenance only; the legacy record is
    /// left untouched, so a following `load` may migrate it again.
    pub async fn reset(&self) -> LibraryState {
        let _guard = self.write_lock.lock().await;
        if let Err(e) = self.store.remove(LIBRARY_KEY).await {
            warn!("Could not remove library record: {}", e);
        } else {
            info!("Library record removed");
        }
        LibraryState::default()
    }
}

fn outcome_label(outcome: &MigrationOutcome) -> String {
    match outcome {
        MigrationOutcome::Skipped(reason) => format!("skipped ({:?})", reason),
        MigrationOutcome::Migrated { key, state, duplicates } => format!(
            "migrated {} entries from {} ({} duplicates dropped)",
            state.watchlist.len(),
            key,
            duplicates
        ),
        MigrationOutcome::Failed { key, reason } => format!("failed to read {}: {}", key, reason),
    }
}
