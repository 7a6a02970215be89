//! Persisted user preferences

use crate::error::{SearchError, SearchResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "search_terminal";
const CONFIG_FILE: &str = "config.json";

/// User preferences stored between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Provider id used for direct searches and tried first in aggressive mode
    pub provider: String,
    /// Engine requested from the provider
    pub engine: String,
    /// Whether searches fail over across providers
    pub aggressive_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: "mullvad".to_string(),
            engine: "google".to_string(),
            aggressive_mode: false,
        }
    }
}

impl Config {
    /// `<config_dir>/search_terminal/config.json`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("No config directory available, using defaults");
                Self::default()
            }
        }
    }

    /// Load from `path`.
    ///
    /// A missing file gives the defaults silently; a file that can't be read
    /// or parsed gives the defaults with a warning.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match Self::read(path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Could not load config from {}: {err}", path.display());
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> SearchResult<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| SearchError::ConfigError(format!("Malformed config file: {e}")))
    }

    /// Save to the default location
    pub fn save(&self) -> SearchResult<()> {
        let path = Self::default_path().ok_or_else(|| {
            SearchError::ConfigError("Failed to get config directory".to_string())
        })?;
        self.save_to(&path)
    }

    /// Save to `path`, creating parent directories as needed
    pub fn save_to(&self, path: &Path) -> SearchResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SearchError::ConfigError(format!(
                    "Failed to create config directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| {
            SearchError::ConfigError(format!(
                "Failed to write config file {}: {e}",
                path.display()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.provider, "mullvad");
        assert_eq!(config.engine, "google");
        assert!(!config.aggressive_mode);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            provider: "excite".to_string(),
            engine: "web".to_string(),
            aggressive_mode: true,
        };
        config.save_to(&path).unwrap();

        assert!(path.exists());
        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_partial_file_fills_missing_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"provider": "ekoru"}"#).unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.provider, "ekoru");
        assert_eq!(config.engine, "google");
        assert!(!config.aggressive_mode);
    }

    #[test]
    fn test_default_path_layout() {
        if let Some(path) = Config::default_path() {
            assert!(path.ends_with("search_terminal/config.json"));
        }
    }
}
