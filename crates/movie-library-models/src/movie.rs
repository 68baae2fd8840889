use serde::{Deserialize, Serialize};

/// Sentinel the catalog uses in place of a poster URL
pub const POSTER_UNAVAILABLE: &str = "N/A";

/// Identity and display data for a catalog item.
///
/// Field aliases accept the catalog-native casing (`imdbID`, `Title`, `Year`,
/// `Poster`) so records written by older builds decode unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct MovieRef {
    #[serde(alias = "imdbID")]
    pub id: String,
    #[serde(alias = "Title")]
    pub title: String,
    #[serde(alias = "Year")]
    pub year: String,
    #[serde(alias = "Poster", default)]
    pub poster_url: Option<String>,
}

impl MovieRef {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        year: impl Into<String>,
        poster_url: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            year: year.into(),
            poster_url,
        }
    }

    /// Poster URL, with the catalog's "N/A" sentinel treated as absent
    pub fn poster(&self) -> Option<&str> {
        self.poster_url
            .as_deref()
            .filter(|url| !url.is_empty() && *url != POSTER_UNAVAILABLE)
    }
}
