use crate::utils::app_paths::AppPaths;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const ENV_API_URL: &str = "CAFE_ADMIN_API_URL";
pub const ENV_TOKEN: &str = "CAFE_ADMIN_TOKEN";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub tables: TableConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every resource path is appended to
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Bearer token sent with every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Quiet period before a table fetch is sent
    pub debounce_ms: u64,

    /// Rows per page for a freshly opened table
    pub default_limit: u32,

    /// Page sizes offered to the user
    pub page_sizes: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is not set
    pub level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            timeout_secs: 30,
            token: None,
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            default_limit: 10,
            page_sizes: vec![10, 20, 50, 100],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl TableConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Accept `limit` only if it is one of `page_sizes`; an empty list
    /// accepts any positive size
    pub fn check_limit(&self, limit: u32) -> Result<u32> {
        if limit == 0 {
            bail!("page size must be at least 1");
        }
        if !self.page_sizes.is_empty() && !self.page_sizes.contains(&limit) {
            let offered: Vec<String> = self.page_sizes.iter().map(u32::to_string).collect();
            bail!(
                "page size {} is not offered (choose one of: {})",
                limit,
                offered.join(", ")
            );
        }
        Ok(limit)
    }
}

impl Config {
    /// Load config from the default location, writing the defaults there
    /// first if the file does not exist yet
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save()?;
            return Ok(default_config.with_env_overrides());
        }

        Ok(Self::load_from(&config_path)?.with_env_overrides())
    }

    /// Load config from a specific file, without environment overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.validate()?;
        debug!(target: "config", path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        AppPaths::config_file()
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            bail!("api.base_url must not be empty");
        }
        if self.tables.default_limit == 0 {
            bail!("tables.default_limit must be at least 1");
        }
        if self.tables.page_sizes.contains(&0) {
            bail!("tables.page_sizes must not contain 0");
        }
        Ok(())
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Replace the API URL and token with values found through `lookup`
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            debug!(target: "config", url = %url, "API URL overridden from environment");
            self.api.base_url = url;
        }
        if let Some(token) = lookup(ENV_TOKEN).filter(|v| !v.trim().is_empty()) {
            self.api.token = Some(token);
        }
        self
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# Cafe Admin Configuration File
# Location: ~/.config/cafe-admin/config.toml (Linux)
#           ~/Library/Application Support/cafe-admin/config.toml (macOS)
#           %APPDATA%\cafe-admin\config.toml (Windows)

[api]
# Backend base URL, resource paths like "roles" are appended to it
# Overridden by CAFE_ADMIN_API_URL
base_url = "http://localhost:3000/api"

# Request timeout in seconds
timeout_secs = 30

# Bearer token (overridden by CAFE_ADMIN_TOKEN)
# token = "..."

[tables]
# Milliseconds to wait after the last page/filter change before fetching
debounce_ms = 300

# Rows per page when a table is first opened
default_limit = 10

# Page sizes offered in list views
page_sizes = [10, 20, 50, 100]

[logging]
# Default log filter, RUST_LOG takes precedence
level = "info"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:3000/api");
        assert_eq!(config.tables.debounce(), Duration::from_millis(300));
        assert_eq!(config.tables.default_limit, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_commented_default_matches_default() {
        let parsed: Config = toml::from_str(&Config::create_default_with_comments()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.api.token = Some("secret".into());
        config.tables.debounce_ms = 150;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[tables]\ndefault_limit = 25\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.tables.default_limit, 25);
        assert_eq!(loaded.tables.debounce_ms, 300);
        assert_eq!(loaded.api, ApiConfig::default());
    }

    #[test]
    fn test_invalid_limit_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[tables]\ndefault_limit = 0\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_check_limit_uses_page_sizes() {
        let tables = TableConfig::default();
        assert_eq!(tables.check_limit(20).unwrap(), 20);
        assert!(tables.check_limit(15).is_err());
        assert!(tables.check_limit(0).is_err());

        let any = TableConfig {
            page_sizes: Vec::new(),
            ..TableConfig::default()
        };
        assert_eq!(any.check_limit(15).unwrap(), 15);
    }

    #[test]
    fn test_overrides() {
        let config = Config::default().with_overrides(|name| match name {
            ENV_API_URL => Some("https://pos.example/api".into()),
            ENV_TOKEN => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.api.base_url, "https://pos.example/api");
        assert_eq!(config.api.token, None);
    }

    #[test]
    fn test_config_events_use_config_target() {
        use crate::utils::logging::{LogRingBuffer, RingBufferWriter};

        let logs = LogRingBuffer::new();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(RingBufferWriter::new(logs.clone()))
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .without_time()
            .compact()
            .finish();

        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        Config::default().save_to(&path).unwrap();

        tracing::subscriber::with_default(subscriber, || {
            Config::load_from(&path)
                .unwrap()
                .with_overrides(|name| (name == ENV_API_URL).then(|| "http://pos.test".into()));
        });

        let entries = logs.get_recent(10);
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.target == "config"));
        assert!(entries[1].message.starts_with("API URL overridden"));
    }
}
