use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that supplies the OMDb key; wins over the config file
pub const OMDB_API_KEY_ENV: &str = "OMDB_API_KEY";

pub const DEFAULT_OMDB_BASE_URL: &str = "https://www.omdbapi.com/";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub omdb: OmdbConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OmdbConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one file per store key; relative to the data dir
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_base_url() -> String {
    DEFAULT_OMDB_BASE_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    15
}

fn default_store_dir() -> PathBuf {
    PathBuf::from("store")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            file: None,
        }
    }
}

impl OmdbConfig {
    /// The API key to use: environment first, then the config file.
    ///
    /// Blank values and the `YOUR_API_KEY` placeholder count as missing.
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var(OMDB_API_KEY_ENV)
            .ok()
            .filter(|key| is_real_key(key))
            .or_else(|| self.api_key.clone().filter(|key| is_real_key(key)))
    }
}

fn is_real_key(key: &str) -> bool {
    !key.trim().is_empty() && key != "YOUR_API_KEY"
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file if present, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.omdb.base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("omdb.base_url cannot be empty"));
        }
        if !self.omdb.base_url.starts_with("http://") && !self.omdb.base_url.starts_with("https://") {
            return Err(anyhow::anyhow!("omdb.base_url must be an http(s) URL: {}", self.omdb.base_url));
        }
        if self.omdb.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("omdb.timeout_seconds must be greater than zero"));
        }
        if self.storage.store_dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("storage.store_dir cannot be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let config = Config {
            omdb: OmdbConfig {
                api_key: Some("test_key".to_string()),
                ..OmdbConfig::default()
            },
            storage: StorageConfig {
                store_dir: PathBuf::from("custom-store"),
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                json: true,
                file: None,
            },
        };

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.omdb.api_key.as_deref(), Some("test_key"));
        assert_eq!(loaded.omdb.base_url, DEFAULT_OMDB_BASE_URL);
        assert_eq!(loaded.storage.store_dir, PathBuf::from("custom-store"));
        assert_eq!(loaded.logging.level, "debug");
        assert!(loaded.logging.json);
    }

    #[test]
    fn test_defaults_from_empty_file() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.omdb.api_key, None);
        assert_eq!(config.omdb.timeout_seconds, 15);
        assert_eq!(config.storage.store_dir, PathBuf::from("store"));
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.omdb.base_url, DEFAULT_OMDB_BASE_URL);
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.omdb.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config.omdb.base_url = DEFAULT_OMDB_BASE_URL.to_string();
        config.omdb.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_placeholder_key_is_not_a_key() {
        assert!(!is_real_key("YOUR_API_KEY"));
        assert!(!is_real_key("  "));
        assert!(is_real_key("abc123"));
    }
}
