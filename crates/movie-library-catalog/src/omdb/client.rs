use async_trait::async_trait;
use movie_library_config::OmdbConfig;
use reqwest::Client;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use crate::error::CatalogError;
use crate::omdb::api::{self, MovieDetails};
use crate::traits::{CatalogClient, SearchPage};

#[derive(Clone)]
pub struct OmdbClient {
    client: Arc<Client>,
    base_url: String,
    api_key: Option<String>,
}

impl OmdbClient {
    /// Build a client. A missing key is not an error here; every request
    /// checks for it and fails fast before touching the network.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Arc::new(client),
            base_url: base_url.into(),
            api_key,
        }
    }

    pub fn from_config(config: &OmdbConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self::with_client(client, config.base_url.clone(), config.resolved_api_key()))
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, CatalogError> {
        self.api_key.as_deref().ok_or(CatalogError::MissingApiKey)
    }
}

/// Race a request against its cancellation token. Dropping the request
/// future aborts the underlying HTTP call.
async fn cancellable<T, F>(cancel: &CancellationToken, request: F) -> Result<T, CatalogError>
where
    F: Future<Output = Result<T, CatalogError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CatalogError::Cancelled),
        result = request => result,
    }
}

#[async_trait]
impl CatalogClient for OmdbClient {
    async fn search(
        &self,
        query: &str,
        page: u32,
        cancel: &CancellationToken,
    ) -> Result<SearchPage, CatalogError> {
        let api_key = self.api_key()?;
        let page = page.max(1);
        debug!("Searching OMDb for '{}' (page {})", query, page);

        cancellable(
            cancel,
            api::search_movies(&self.client, &self.base_url, api_key, query, page),
        )
        .await
    }

    async fn get_details(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<MovieDetails, CatalogError> {
        let api_key = self.api_key()?;
        debug!("Fetching OMDb details for {}", id);

        cancellable(
            cancel,
            api::get_movie_details(&self.client, &self.base_url, api_key, id),
        )
        .await
    }
}
