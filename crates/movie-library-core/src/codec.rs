use movie_library_models::LibraryState;
use tracing::warn;

/// Result of decoding a stored library record.
///
/// Decoding never fails: unusable data degrades to an empty library and the
/// reason is kept so callers and tests can see that recovery happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// The record parsed and satisfied every invariant
    Valid(LibraryState),
    /// No record has been written yet
    Missing,
    /// The record was malformed (state is empty) or broke an invariant
    /// (state is the repaired library)
    Recovered { state: LibraryState, reason: String },
    /// The store could not be read; the record may still hold data, so it
    /// must not be overwritten
    Unavailable { reason: String },
}

impl Decoded {
    pub fn state(&self) -> LibraryState {
        match self {
            Decoded::Valid(state) | Decoded::Recovered { state, .. } => state.clone(),
            Decoded::Missing | Decoded::Unavailable { .. } => LibraryState::default(),
        }
    }

    pub fn into_state(self) -> LibraryState {
        match self {
            Decoded::Valid(state) | Decoded::Recovered { state, .. } => state,
            Decoded::Missing | Decoded::Unavailable { .. } => LibraryState::default(),
        }
    }

    pub fn is_recovered(&self) -> bool {
        matches!(self, Decoded::Recovered { .. })
    }

    /// Whether the state reflects what is stored, so writing it back is safe
    pub fn is_writable(&self) -> bool {
        !matches!(self, Decoded::Unavailable { .. })
    }
}

pub fn encode(state: &LibraryState) -> Result<String, serde_json::Error> {
    serde_json::to_string(state)
}

pub fn decode(raw: Option<&str>) -> Decoded {
    let Some(raw) = raw else {
        return Decoded::Missing;
    };

    let mut state: LibraryState = match serde_json::from_str(raw) {
        Ok(state) => state,
        Err(e) => {
            warn!("Library record is unreadable ({}); treating it as empty", e);
            return Decoded::Recovered {
                state: LibraryState::default(),
                reason: e.to_string(),
            };
        }
    };

    match state.check_invariants() {
        Ok(()) => Decoded::Valid(state),
        Err(violation) => {
            warn!("Library record breaks an invariant ({}); repairing", violation);
            state.repair();
            Decoded::Recovered {
                state,
                reason: violation.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use movie_library_models::{MovieRef, UserRating, WatchedEntry};

    fn sample() -> LibraryState {
        LibraryState {
            watchlist: vec![
                MovieRef::new("tt2", "Heat", "1995", None),
                MovieRef::new("tt1", "Alien", "1979", Some("https://img/alien.jpg".to_string())),
            ],
            watched: vec![WatchedEntry::new(
                MovieRef::new("tt3", "Ran", "1985", None),
                Utc.timestamp_millis_opt(1_700_000_000_123).unwrap(),
                Some(UserRating::new(10).unwrap()),
            )],
        }
    }

    #[test]
    fn test_roundtrip() {
        let state = sample();
        let encoded = encode(&state).unwrap();
        assert_eq!(decode(Some(&encoded)), Decoded::Valid(state.clone()));
        assert_eq!(encode(&decode(Some(&encoded)).into_state()).unwrap(), encoded);
    }

    #[test]
    fn test_roundtrip_empty() {
        let encoded = encode(&LibraryState::default()).unwrap();
        assert_eq!(encoded, r#"{"watchlist":[],"watched":[]}"#);
        assert_eq!(decode(Some(&encoded)), Decoded::Valid(LibraryState::default()));
    }

    #[test]
    fn test_missing_is_empty_without_recovery() {
        let decoded = decode(None);
        assert_eq!(decoded, Decoded::Missing);
        assert!(!decoded.is_recovered());
        assert!(decoded.state().is_empty());
    }

    #[test]
    fn test_only_unavailable_blocks_writes() {
        let unavailable = Decoded::Unavailable {
            reason: "EIO".to_string(),
        };
        assert!(!unavailable.is_writable());
        assert!(!unavailable.is_recovered());
        assert!(unavailable.state().is_empty());

        assert!(decode(None).is_writable());
        assert!(decode(Some("not json")).is_writable());
    }

    #[test]
    fn test_garbage_decodes_to_empty() {
        for raw in ["", "not json", "null", "[1,2,3]", r#"{"watchlist": 5}"#] {
            let decoded = decode(Some(raw));
            assert!(decoded.is_recovered(), "{:?} should be recovered", raw);
            assert_eq!(decoded.into_state(), LibraryState::default());
        }
    }

    #[test]
    fn test_out_of_range_rating_is_unreadable() {
        let raw = r#"{"watchlist":[],"watched":[{"id":"tt1","title":"A","year":"2000","posterUrl":null,"watchedAt":1,"userRating":99}]}"#;
        let decoded = decode(Some(raw));
        assert!(decoded.is_recovered());
        assert!(decoded.state().is_empty());
    }

    #[test]
    fn test_invariant_violation_is_repaired() {
        let raw = r#"{
            "watchlist": [
                {"id": "tt1", "title": "A", "year": "2000", "posterUrl": null},
                {"id": "tt1", "title": "A", "year": "2000", "posterUrl": null},
                {"id": "tt2", "title": "B", "year": "2001", "posterUrl": null}
            ],
            "watched": [
                {"id": "tt2", "title": "B", "year": "2001", "posterUrl": null, "watchedAt": 5}
            ]
        }"#;
        let decoded = decode(Some(raw));
        assert!(decoded.is_recovered());
        let state = decoded.into_state();
        assert!(state.check_invariants().is_ok());
        assert_eq!(state.watchlist.len(), 1);
        assert_eq!(state.watchlist[0].id, "tt1");
        assert_eq!(state.watched[0].id(), "tt2");
    }

    #[test]
    fn test_catalog_cased_entries_decode() {
        let raw = r#"{"watchlist":[{"imdbID":"tt1","Title":"A","Year":"2000","Poster":"N/A"}],"watched":[{"imdbID":"tt2","Title":"B","Year":"2001","Poster":"N/A","watchedAt":1700000000000}]}"#;
        let state = decode(Some(raw)).into_state();
        assert_eq!(state.watchlist[0].id, "tt1");
        assert_eq!(state.watched[0].id(), "tt2");
        assert_eq!(state.watched[0].user_rating, None);
    }
}
