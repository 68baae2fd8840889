use async_trait::async_trait;
use movie_library_models::MovieRef;
use tokio_util::sync::CancellationToken;
use crate::error::CatalogError;
use crate::omdb::MovieDetails;

/// Results per search page in the reference catalog
pub const PAGE_SIZE: u64 = 10;

/// One page of search matches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub results: Vec<MovieRef>,
    pub total_results: u64,
    /// Catalog-reported failure text (e.g. "Movie not found!")
    pub error: Option<String>,
}

impl SearchPage {
    pub fn total_pages(&self) -> u64 {
        total_pages(self.total_results)
    }
}

pub fn total_pages(total_results: u64) -> u64 {
    total_results.div_ceil(PAGE_SIZE)
}

#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Search movies by free text; `page` is 1-based.
    ///
    /// A catalog-reported failure comes back as an empty page with `error`
    /// set. Transport failures and cancellation are errors.
    async fn search(
        &self,
        query: &str,
        page: u32,
        cancel: &CancellationToken,
    ) -> Result<SearchPage, CatalogError>;

    /// Full record for one id; not-found is `CatalogError::Catalog`
    async fn get_details(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<MovieDetails, CatalogError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0), 0);
        assert_eq!(total_pages(1), 1);
        assert_eq!(total_pages(10), 1);
        assert_eq!(total_pages(11), 2);
        assert_eq!(total_pages(423), 43);
    }
}
