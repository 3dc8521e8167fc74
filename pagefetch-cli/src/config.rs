//! Configuration file.
//!
//! A JSON document at `<config_dir>/pagefetch/config.json`. A missing file
//! means defaults; missing fields inside it do too.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pagefetch_fetch::FetchSettings;
use serde::{Deserialize, Serialize};
use tracing::info;

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Settings handed to every fetcher.
    #[serde(default)]
    pub fetch: FetchSettings,
}

/// General settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level for pagefetch targets when neither `--verbose` nor `--quiet` is given.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Returns the configuration directory.
    pub fn default_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pagefetch")
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_dir().join("config.json")
    }

    /// Returns `path` if given, otherwise the default path.
    pub fn resolve_path(path: Option<&Path>) -> PathBuf {
        path.map_or_else(Self::default_path, Path::to_path_buf)
    }

    /// Loads configuration from a specific path.
    ///
    /// Runs before logging is set up, so it does not log; the caller reports
    /// which file was used.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Saves configuration to a specific path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;

        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.general.log_level, "warn");
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.fetch = config
            .fetch
            .with_timeout(Duration::from_secs(5))
            .with_render_endpoint("http://render.local:8050");
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"fetch": {"max_redirects": 3}}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.fetch.max_redirects, 3);
        assert_eq!(config.fetch.timeout, Duration::from_secs(30));
        assert_eq!(config.general.log_level, "warn");
    }

    #[test]
    fn test_invalid_file_names_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn test_resolve_path() {
        let explicit = Path::new("/tmp/pagefetch.json");
        assert_eq!(Config::resolve_path(Some(explicit)), explicit);
        assert_eq!(Config::resolve_path(None), Config::default_path());
    }

    #[test]
    fn test_default_path() {
        assert!(Config::default_path().ends_with("pagefetch/config.json"));
    }
}
