pub mod config;
pub mod logging;
pub mod paths;

pub use config::{Config, LoggingConfig, OmdbConfig, StorageConfig, DEFAULT_OMDB_BASE_URL, OMDB_API_KEY_ENV};
pub use logging::init_logging;
pub use paths::{base_path_override, PathManager};
