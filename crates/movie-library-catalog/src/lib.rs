pub mod error;
pub mod omdb;
pub mod search;
pub mod traits;

pub use error::CatalogError;
pub use omdb::{MovieDetails, OmdbClient};
pub use search::{SearchOutcome, SearchSession, SearchState, MIN_QUERY_CHARS};
pub use traits::{CatalogClient, SearchPage, PAGE_SIZE};
pub use tokio_util::sync::CancellationToken;
