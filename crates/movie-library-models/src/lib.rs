pub mod legacy;
pub mod library;
pub mod movie;
pub mod rating;
pub mod watched;

pub use legacy::LegacyWatchlistMovie;
pub use library::{InvariantViolation, LibraryState, Membership};
pub use movie::{MovieRef, POSTER_UNAVAILABLE};
pub use rating::{ModelError, UserRating};
pub use watched::WatchedEntry;
