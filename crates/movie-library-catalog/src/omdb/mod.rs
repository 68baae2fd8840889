pub mod api;
pub mod client;


pub use api::MovieDetails;
pub use client::OmdbClient;
