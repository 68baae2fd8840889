use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::movie::MovieRef;
use crate::rating::UserRating;

/// A movie moved to the watched list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WatchedEntry {
    #[serde(flatten)]
    pub movie: MovieRef,
    /// Set when the movie was marked watched; stored as epoch milliseconds
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub watched_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_rating: Option<UserRating>,
}

impl WatchedEntry {
    pub fn new(movie: MovieRef, watched_at: DateTime<Utc>, user_rating: Option<UserRating>) -> Self {
        Self {
            movie,
            watched_at,
            user_rating,
        }
    }

    pub fn id(&self) -> &str {
        &self.movie.id
    }

    /// The bare movie reference, without watch metadata
    pub fn to_movie_ref(&self) -> MovieRef {
        self.movie.clone()
    }
}
