//! Search results model for a search-as-you-type screen.
//!
//! Each new query bumps a generation counter and cancels the request that was
//! in flight for the previous one. A response is applied only if its
//! generation is still current, so a slow stale response can never overwrite
//! results for a newer query. Input debouncing is left to the caller.

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use movie_library_models::MovieRef;
use crate::error::CatalogError;
use crate::traits::{total_pages, CatalogClient};

/// Queries shorter than this (after trimming) do not hit the catalog
pub const MIN_QUERY_CHARS: usize = 3;

/// Snapshot of what the search screen renders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<MovieRef>,
    pub total_results: u64,
    pub page: u32,
    pub is_loading: bool,
    pub is_loading_more: bool,
    pub error: Option<String>,
}

impl SearchState {
    pub fn can_search(&self) -> bool {
        can_search(&self.query)
    }

    pub fn total_pages(&self) -> u64 {
        total_pages(self.total_results)
    }

    pub fn has_more(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }
}

pub fn can_search(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_CHARS
}

/// What happened to a search or load-more request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The response was written into the state
    Applied,
    /// A newer query started before the response arrived; it was dropped
    Superseded,
    /// Preconditions were not met, no request was sent
    Skipped,
}

struct Inner {
    state: SearchState,
    generation: u64,
    in_flight: Option<CancellationToken>,
}

pub struct SearchSession<C: CatalogClient + ?Sized> {
    client: Arc<C>,
    inner: Mutex<Inner>,
}

impl<C: CatalogClient + ?Sized> SearchSession<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            inner: Mutex::new(Inner {
                state: SearchState::default(),
                generation: 0,
                in_flight: None,
            }),
        }
    }

    pub async fn state(&self) -> SearchState {
        self.inner.lock().await.state.clone()
    }

    /// Start a new query: reset results, cancel the previous request, and
    /// fetch page 1 if the query is long enough.
    pub async fn search(&self, query: &str) -> SearchOutcome {
        let query = query.trim().to_string();

        let (generation, cancel) = {
            let mut inner = self.inner.lock().await;
            if let Some(previous) = inner.in_flight.take() {
                previous.cancel();
            }
            inner.generation += 1;
            inner.state = SearchState {
                query: query.clone(),
                page: 1,
                ..SearchState::default()
            };

            if !can_search(&query) {
                return SearchOutcome::Skipped;
            }

            let cancel = CancellationToken::new();
            inner.in_flight = Some(cancel.clone());
            inner.state.is_loading = true;
            (inner.generation, cancel)
        };

        let result = self.client.search(&query, 1, &cancel).await;

        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            debug!("Dropping stale search results for '{}'", query);
            return SearchOutcome::Superseded;
        }
        inner.in_flight = None;
        inner.state.is_loading = false;

        match result {
            Ok(page) => {
                inner.state.results = page.results;
                inner.state.total_results = page.total_results;
                inner.state.error = page.error;
            }
            Err(e) => record_error(&mut inner.state, e),
        }
        SearchOutcome::Applied
    }

    /// Fetch the next page and append unseen results.
    ///
    /// Skipped while another load is running, after an error, or when the
    /// last page has been reached.
    pub async fn load_more(&self) -> SearchOutcome {
        let (generation, cancel, query, next_page) = {
            let mut inner = self.inner.lock().await;
            let state = &inner.state;
            if !state.can_search()
                || !state.has_more()
                || state.is_loading
                || state.is_loading_more
                || state.error.is_some()
            {
                return SearchOutcome::Skipped;
            }

            let cancel = CancellationToken::new();
            inner.in_flight = Some(cancel.clone());
            inner.state.is_loading_more = true;
            (
                inner.generation,
                cancel,
                inner.state.query.clone(),
                inner.state.page + 1,
            )
        };

        let result = self.client.search(&query, next_page, &cancel).await;

        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            return SearchOutcome::Superseded;
        }
        inner.in_flight = None;
        inner.state.is_loading_more = false;

        match result {
            Ok(page) => {
                let seen: HashSet<String> =
                    inner.state.results.iter().map(|m| m.id.clone()).collect();
                inner
                    .state
                    .results
                    .extend(page.results.into_iter().filter(|m| !seen.contains(&m.id)));
                inner.state.page = next_page;
                if page.error.is_some() {
                    inner.state.error = page.error;
                }
            }
            Err(e) => record_error(&mut inner.state, e),
        }
        SearchOutcome::Applied
    }

    /// Cancel whatever is in flight, e.g. when the screen goes away
    pub async fn cancel(&self) {
        let mut inner = self.inner.lock().await;
        inner.generation += 1;
        inner.state.is_loading = false;
        inner.state.is_loading_more = false;
        if let Some(token) = inner.in_flight.take() {
            token.cancel();
        }
    }
}

fn record_error(state: &mut SearchState, error: CatalogError) {
    if error.is_cancelled() {
        return;
    }
    state.error = Some(error.to_string());
}
