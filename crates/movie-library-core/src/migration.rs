//! One-time import of the retired single-list watchlist into the combined
//! library format.
//!
//! The routine only plans; the manager persists the result so it stays the
//! single writer of the library key. Every failure degrades to "nothing to
//! migrate" and is logged, never raised.

use movie_library_models::{LegacyWatchlistMovie, LibraryState, MovieRef};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use crate::store::KeyValueStore;

/// Legacy record keys, consulted in order; the first one present wins.
///
/// `movie-watchlist:v1` is where the single-list screens actually wrote.
pub const LEGACY_KEYS: [&str; 2] = ["watchlist:v1", "movie-watchlist:v1"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The library already has entries; migration can never run again
    LibraryNotEmpty,
    /// The library record could not be read, so it cannot be known empty
    LibraryUnreadable,
    /// No legacy record exists
    NoLegacyData,
    /// A legacy record exists but lists nothing
    LegacyEmpty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    Skipped(SkipReason),
    /// `state` should be written; `duplicates` counts collapsed repeat ids
    Migrated {
        key: &'static str,
        state: LibraryState,
        duplicates: usize,
    },
    /// The legacy record could not be read; the library stays as it was
    Failed { key: &'static str, reason: String },
}

/// Decide what, if anything, to import given the current library
pub async fn plan_migration<S>(store: &S, current: &LibraryState) -> MigrationOutcome
where
    S: KeyValueStore + ?Sized,
{
    if !current.is_empty() {
        return MigrationOutcome::Skipped(SkipReason::LibraryNotEmpty);
    }

    for key in LEGACY_KEYS {
        let raw = match store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => continue,
            Err(e) => {
                warn!("Could not read legacy watchlist {}: {}", key, e);
                return MigrationOutcome::Failed {
                    key,
                    reason: e.to_string(),
                };
            }
        };

        debug!("Found legacy watchlist under {}", key);
        return convert_legacy(key, &raw);
    }

    MigrationOutcome::Skipped(SkipReason::NoLegacyData)
}

fn convert_legacy(key: &'static str, raw: &str) -> MigrationOutcome {
    let legacy: Vec<LegacyWatchlistMovie> = match serde_json::from_str(raw) {
        Ok(list) => list,
        Err(e) => {
            warn!("Legacy watchlist {} is unreadable, skipping migration: {}", key, e);
            return MigrationOutcome::Failed {
                key,
                reason: e.to_string(),
            };
        }
    };

    if legacy.is_empty() {
        return MigrationOutcome::Skipped(SkipReason::LegacyEmpty);
    }

    let total = legacy.len();
    let mut seen = HashSet::new();
    let watchlist: Vec<MovieRef> = legacy
        .into_iter()
        .map(MovieRef::from)
        .filter(|movie| seen.insert(movie.id.clone()))
        .collect();
    let duplicates = total - watchlist.len();

    info!(
        "Migrating {} legacy watchlist entries from {} ({} duplicates dropped)",
        watchlist.len(),
        key,
        duplicates
    );

    MigrationOutcome::Migrated {
        key,
        state: LibraryState {
            watchlist,
            watched: Vec::new(),
        },
        duplicates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn movie(id: &str) -> MovieRef {
        MovieRef::new(id, format!("Movie {}", id), "2020", None)
    }

    #[tokio::test]
    async fn test_skips_when_library_has_entries() {
        let store = MemoryStore::with_entries([(
            "watchlist:v1",
            r#"[{"id":"tt9","title":"X","year":"1999","posterUrl":"p","addedAt":100}]"#,
        )]);
        let current = LibraryState {
            watchlist: vec![movie("tt1")],
            watched: vec![],
        };
        assert_eq!(
            plan_migration(&store, &current).await,
            MigrationOutcome::Skipped(SkipReason::LibraryNotEmpty)
        );
    }

    #[tokio::test]
    async fn test_skips_without_legacy_data() {
        let store = MemoryStore::new();
        assert_eq!(
            plan_migration(&store, &LibraryState::default()).await,
            MigrationOutcome::Skipped(SkipReason::NoLegacyData)
        );
    }

    #[tokio::test]
    async fn test_maps_legacy_records() {
        let store = MemoryStore::with_entries([(
            "watchlist:v1",
            r#"[
                {"id":"tt9","title":"X","year":"1999","posterUrl":"p","addedAt":100},
                {"id":"tt8","title":"Y","year":"2001","posterUrl":null,"addedAt":50}
            ]"#,
        )]);

        match plan_migration(&store, &LibraryState::default()).await {
            MigrationOutcome::Migrated { key, state, duplicates } => {
                assert_eq!(key, "watchlist:v1");
                assert_eq!(duplicates, 0);
                assert_eq!(
                    state.watchlist,
                    vec![
                        MovieRef::new("tt9", "X", "1999", Some("p".to_string())),
                        MovieRef::new("tt8", "Y", "2001", None),
                    ]
                );
                assert!(state.watched.is_empty());
            }
            other => panic!("expected migration, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_falls_back_to_second_legacy_key() {
        let store = MemoryStore::with_entries([(
            "movie-watchlist:v1",
            r#"[{"imdbID":"tt1","Title":"Heat","Year":"1995","Poster":"N/A","addedAt":1700000000000}]"#,
        )]);

        match plan_migration(&store, &LibraryState::default()).await {
            MigrationOutcome::Migrated { key, state, .. } => {
                assert_eq!(key, "movie-watchlist:v1");
                assert_eq!(state.watchlist[0].id, "tt1");
                assert_eq!(state.watchlist[0].title, "Heat");
            }
            other => panic!("expected migration, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_collapses_duplicate_ids() {
        let store = MemoryStore::with_entries([(
            "watchlist:v1",
            r#"[
                {"id":"tt1","title":"A","year":"2000","posterUrl":null,"addedAt":3},
                {"id":"tt1","title":"A again","year":"2000","posterUrl":null,"addedAt":2}
            ]"#,
        )]);

        match plan_migration(&store, &LibraryState::default()).await {
            MigrationOutcome::Migrated { state, duplicates, .. } => {
                assert_eq!(duplicates, 1);
                assert_eq!(state.watchlist.len(), 1);
                assert_eq!(state.watchlist[0].title, "A");
            }
            other => panic!("expected migration, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreadable_legacy_is_swallowed() {
        let store = MemoryStore::with_entries([("watchlist:v1", "{definitely not a list")]);
        let outcome = plan_migration(&store, &LibraryState::default()).await;
        assert!(matches!(outcome, MigrationOutcome::Failed { key: "watchlist:v1", .. }));
    }

    #[tokio::test]
    async fn test_odd_added_at_still_migrates() {
        let store = MemoryStore::with_entries([(
            "watchlist:v1",
            r#"[{"id":"tt1","title":"A","year":"2000","posterUrl":null,"addedAt":"2023-01-01"}]"#,
        )]);
        let outcome = plan_migration(&store, &LibraryState::default()).await;
        assert!(matches!(outcome, MigrationOutcome::Migrated { duplicates: 0, .. }));
    }

    #[tokio::test]
    async fn test_empty_legacy_list() {
        let store = MemoryStore::with_entries([("watchlist:v1", "[]")]);
        assert_eq!(
            plan_migration(&store, &LibraryState::default()).await,
            MigrationOutcome::Skipped(SkipReason::LegacyEmpty)
        );
    }
}
