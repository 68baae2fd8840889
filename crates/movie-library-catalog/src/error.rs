use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Missing OMDb API key. Set OMDB_API_KEY or [omdb].api_key in config.toml.")]
    MissingApiKey,

    #[error("request cancelled")]
    Cancelled,

    /// The catalog answered with `Response: "False"`; carries its own text
    #[error("{0}")]
    Catalog(String),

    #[error("catalog returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected catalog response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl CatalogError {
    /// Cancellation is not a failure and must not be shown to the user
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CatalogError::Cancelled)
    }
}
