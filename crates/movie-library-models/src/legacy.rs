use serde::{Deserialize, Serialize};
use crate::movie::MovieRef;

/// A record from the retired single-list watchlist format.
///
/// Only read during migration; `added_at` has no counterpart in the current
/// model and is dropped on conversion. It is kept as raw JSON so an odd
/// value (float, string) does not reject the record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LegacyWatchlistMovie {
    #[serde(flatten)]
    pub movie: MovieRef,
    #[serde(default)]
    pub added_at: Option<serde_json::Value>,
}

impl From<LegacyWatchlistMovie> for MovieRef {
    fn from(legacy: LegacyWatchlistMovie) -> Self {
        legacy.movie
    }
}
