//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/linkshelf/config.toml)
//! 3. Environment variables (SHELF_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::repository::DEFAULT_RECENT_COUNT;
use crate::storage::FileStorage;

/// Environment variable prefix
const ENV_PREFIX: &str = "SHELF";

/// Default storage budget, the same 5 MiB browsers give local storage
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the storage slots
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// How many links the recent view shows
    #[serde(default = "default_recent_count")]
    pub recent_count: usize,

    /// Storage budget in bytes across all slots (0 = unlimited)
    #[serde(default = "default_quota_bytes")]
    pub quota_bytes: u64,

    /// Log file for the terminal page (default: {data_dir}/debug.log)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            recent_count: DEFAULT_RECENT_COUNT,
            quota_bytes: DEFAULT_QUOTA_BYTES,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (SHELF_DATA_DIR, SHELF_RECENT_COUNT, SHELF_QUOTA_BYTES)
    /// 2. Config file (~/.config/linkshelf/config.toml or SHELF_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config
            .validate()
            .with_context(|| format!("Invalid config file: {:?}", path))?;
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject values the rest of the app cannot work with
    fn validate(&self) -> Result<()> {
        if self.recent_count == 0 {
            bail!("recent_count must be a positive integer");
        }
        Ok(())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // SHELF_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // SHELF_RECENT_COUNT (ignored unless a positive integer)
        if let Ok(val) = std::env::var(format!("{}_RECENT_COUNT", ENV_PREFIX)) {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => self.recent_count = n,
                _ => tracing::warn!("Ignoring invalid {}_RECENT_COUNT: {:?}", ENV_PREFIX, val),
            }
        }

        // SHELF_QUOTA_BYTES
        if let Ok(val) = std::env::var(format!("{}_QUOTA_BYTES", ENV_PREFIX)) {
            match val.parse::<u64>() {
                Ok(n) => self.quota_bytes = n,
                Err(_) => tracing::warn!("Ignoring invalid {}_QUOTA_BYTES: {:?}", ENV_PREFIX, val),
            }
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with SHELF_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("linkshelf")
            .join("config.toml")
    }

    /// Storage budget, `None` when unlimited
    pub fn quota(&self) -> Option<u64> {
        (self.quota_bytes > 0).then_some(self.quota_bytes)
    }

    /// Directory holding the storage slots, apart from logs
    pub fn storage_dir(&self) -> PathBuf {
        self.data_dir.join("storage")
    }

    /// File storage over the storage directory with the configured budget
    pub fn open_storage(&self) -> FileStorage {
        FileStorage::new(self.storage_dir()).with_quota(self.quota())
    }

    /// Log file for the terminal page
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("debug.log"))
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("linkshelf")
}

fn default_recent_count() -> usize {
    DEFAULT_RECENT_COUNT
}

fn default_quota_bytes() -> u64 {
    DEFAULT_QUOTA_BYTES
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "SHELF_DATA_DIR",
        "SHELF_RECENT_COUNT",
        "SHELF_QUOTA_BYTES",
        "SHELF_CONFIG",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.recent_count, 3);
        assert_eq!(config.quota_bytes, 5 * 1024 * 1024);
        assert!(config.log_file.is_none());
        assert!(config.data_dir.ends_with("linkshelf"));
    }

    #[test]
    fn test_quota_zero_is_unlimited() {
        let mut config = Config::default();
        assert_eq!(config.quota(), Some(DEFAULT_QUOTA_BYTES));

        config.quota_bytes = 0;
        assert_eq!(config.quota(), None);
    }

    #[test]
    fn test_log_path_default() {
        let config = Config {
            data_dir: PathBuf::from("/data/linkshelf"),
            ..Config::default()
        };
        assert_eq!(config.log_path(), PathBuf::from("/data/linkshelf/debug.log"));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("SHELF_DATA_DIR", "/tmp/linkshelf-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/linkshelf-test"));
    }

    #[test]
    fn test_env_override_recent_count() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("SHELF_RECENT_COUNT", "5");
        config.apply_env_overrides();
        assert_eq!(config.recent_count, 5);

        // Zero and garbage are ignored
        env::set_var("SHELF_RECENT_COUNT", "0");
        config.apply_env_overrides();
        assert_eq!(config.recent_count, 5);

        env::set_var("SHELF_RECENT_COUNT", "many");
        config.apply_env_overrides();
        assert_eq!(config.recent_count, 5);
    }

    #[test]
    fn test_env_override_quota() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("SHELF_QUOTA_BYTES", "0");
        config.apply_env_overrides();
        assert_eq!(config.quota(), None);
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/linkshelf"),
            recent_count: 4,
            quota_bytes: 1024,
            log_file: Some(PathBuf::from("/tmp/shelf.log")),
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("recent_count"));
        assert!(toml_str.contains("quota_bytes"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.recent_count, 4);
        assert_eq!(parsed.quota_bytes, 1024);
        assert_eq!(parsed.log_file, config.log_file);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            recent_count = 10
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.recent_count, 10);
        // Unset keys keep their defaults
        assert_eq!(config.quota_bytes, DEFAULT_QUOTA_BYTES);
    }

    #[test]
    fn test_zero_recent_count_rejected() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = TempDir::new().unwrap();
        env::set_var("SHELF_DATA_DIR", temp_dir.path().join("data"));

        assert!(Config::load_from_str("recent_count = 0").is_err());

        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "recent_count = 0\n").unwrap();
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("recent_count"));

        // A valid env override wins over the bad file value
        env::set_var("SHELF_RECENT_COUNT", "2");
        assert_eq!(Config::load_from_path(&path).unwrap().recent_count, 2);
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = TempDir::new().unwrap();
        env::set_var("SHELF_DATA_DIR", temp_dir.path().join("data"));

        let path = temp_dir.path().join("missing.toml");
        let config = Config::load_from_path(&path).unwrap();

        assert_eq!(config.recent_count, DEFAULT_RECENT_COUNT);
        assert!(temp_dir.path().join("data").exists());
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            data_dir: temp_dir.path().join("data"),
            recent_count: 7,
            ..Config::default()
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.data_dir, config.data_dir);
        assert_eq!(loaded.recent_count, 7);
    }

    #[test]
    fn test_open_storage_under_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };

        let storage = config.open_storage();
        assert_eq!(storage.dir(), temp_dir.path().join("storage"));
        assert_ne!(config.log_path().parent(), Some(storage.dir()));
    }
}
