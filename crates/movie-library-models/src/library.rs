use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use crate::movie::MovieRef;
use crate::watched::WatchedEntry;

/// The persisted library: a watchlist and a watched list, both newest first.
///
/// A given id lives in at most one of the two lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibraryState {
    #[serde(default)]
    pub watchlist: Vec<MovieRef>,
    #[serde(default)]
    pub watched: Vec<WatchedEntry>,
}

/// Which list, if any, currently holds an id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Membership {
    None,
    Watchlist,
    Watched,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("{0} appears more than once in the watchlist")]
    DuplicateInWatchlist(String),
    #[error("{0} appears more than once in the watched list")]
    DuplicateInWatched(String),
    #[error("{0} is in both the watchlist and the watched list")]
    InBothLists(String),
}

impl LibraryState {
    pub fn is_empty(&self) -> bool {
        self.watchlist.is_empty() && self.watched.is_empty()
    }

    pub fn contains_watchlist(&self, id: &str) -> bool {
        self.watchlist.iter().any(|m| m.id == id)
    }

    pub fn contains_watched(&self, id: &str) -> bool {
        self.watched.iter().any(|m| m.id() == id)
    }

    pub fn membership(&self, id: &str) -> Membership {
        if self.contains_watched(id) {
            Membership::Watched
        } else if self.contains_watchlist(id) {
            Membership::Watchlist
        } else {
            Membership::None
        }
    }

    /// Ids saved to the watchlist, for "saved" badges in result lists
    pub fn watchlist_ids(&self) -> HashSet<&str> {
        self.watchlist.iter().map(|m| m.id.as_str()).collect()
    }

    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut watchlist_ids = HashSet::new();
        for movie in &self.watchlist {
            if !watchlist_ids.insert(movie.id.as_str()) {
                return Err(InvariantViolation::DuplicateInWatchlist(movie.id.clone()));
            }
        }

        let mut watched_ids = HashSet::new();
        for entry in &self.watched {
            if !watched_ids.insert(entry.id()) {
                return Err(InvariantViolation::DuplicateInWatched(entry.id().to_string()));
            }
            if watchlist_ids.contains(entry.id()) {
                return Err(InvariantViolation::InBothLists(entry.id().to_string()));
            }
        }

        Ok(())
    }

    /// Drop entries that break the invariants, keeping the first (newest)
    /// occurrence of each id. An id found in both lists stays watched.
    ///
    /// Returns true if anything was removed.
    pub fn repair(&mut self) -> bool {
        let before = self.watchlist.len() + self.watched.len();

        let mut seen = HashSet::new();
        self.watched.retain(|entry| seen.insert(entry.id().to_string()));

        let mut seen_watchlist = HashSet::new();
        self.watchlist
            .retain(|movie| !seen.contains(&movie.id) && seen_watchlist.insert(movie.id.clone()));

        before != self.watchlist.len() + self.watched.len()
    }
}
