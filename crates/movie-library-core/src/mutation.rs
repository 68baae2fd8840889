//! Pure list transitions. Each returns whether the state changed; the
//! manager decides what to persist.

use chrono::{DateTime, Utc};
use movie_library_models::{LibraryState, MovieRef, UserRating, WatchedEntry};

fn remove_from_watched(state: &mut LibraryState, id: &str) -> Option<WatchedEntry> {
    let index = state.watched.iter().position(|m| m.id() == id)?;
    let removed = state.watched.remove(index);
    // Tolerate duplicates left by older builds
    state.watched.retain(|m| m.id() != id);
    Some(removed)
}

/// Move or add a movie to the front of the watchlist
pub fn add_to_watchlist(state: &mut LibraryState, movie: MovieRef) -> bool {
    let was_watched = remove_from_watched(state, &movie.id).is_some();

    if state.contains_watchlist(&movie.id) {
        return was_watched;
    }
    state.watchlist.insert(0, movie);
    true
}

pub fn remove_from_watchlist(state: &mut LibraryState, id: &str) -> bool {
    let before = state.watchlist.len();
    state.watchlist.retain(|m| m.id != id);
    before != state.watchlist.len()
}

/// Move or add a movie to the front of the watched list.
///
/// An already-watched movie keeps its original `watched_at` and rating.
pub fn mark_watched(
    state: &mut LibraryState,
    movie: MovieRef,
    watched_at: DateTime<Utc>,
    rating: Option<UserRating>,
) -> bool {
    let was_listed = remove_from_watchlist(state, &movie.id);

    if state.contains_watched(&movie.id) {
        return was_listed;
    }
    state.watched.insert(0, WatchedEntry::new(movie, watched_at, rating));
    true
}

/// Move a watched movie back to the front of the watchlist
pub fn unwatch(state: &mut LibraryState, id: &str) -> bool {
    let Some(entry) = remove_from_watched(state, id) else {
        return false;
    };

    if !state.contains_watchlist(id) {
        state.watchlist.insert(0, entry.to_movie_ref());
    }
    true
}
