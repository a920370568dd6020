//! Configuration file
//!
//! Read from `<config dir>/note2anki/config.toml` unless a path is given.
//! Every key is optional:
//!
//! ```toml
//! anki_url = "http://localhost:8765"
//! deck = "Obsidian Notes"
//! strategy = "qa"
//! default_tag = "obsidian"
//! allow_duplicate = false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cards::Strategy;
use crate::obsidian::ConvertOptions;

pub const DEFAULT_ANKI_URL: &str = "http://localhost:8765";
pub const DEFAULT_DECK: &str = "Obsidian Notes";
pub const DEFAULT_MODEL: &str = "Basic";
pub const DEFAULT_FRONT_FIELD: &str = "Front";
pub const DEFAULT_BACK_FIELD: &str = "Back";
pub const DEFAULT_TAG: &str = "obsidian";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown card type '{0}'. Valid types: qa, whole")]
    UnknownStrategy(String),

    #[error("Failed to read config {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {}: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// AnkiConnect endpoint
    pub anki_url: String,
    /// Target deck name
    pub deck: String,
    /// Note type used for new cards
    pub model_name: String,
    pub front_field: String,
    pub back_field: String,
    /// Tag applied when a note has no `tags` front-matter
    pub default_tag: String,
    pub allow_duplicate: bool,
    /// Card type selector, `qa` or `whole`
    pub strategy: String,
    /// File suffixes treated as notes when walking a directory
    pub extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            anki_url: DEFAULT_ANKI_URL.to_string(),
            deck: DEFAULT_DECK.to_string(),
            model_name: DEFAULT_MODEL.to_string(),
            front_field: DEFAULT_FRONT_FIELD.to_string(),
            back_field: DEFAULT_BACK_FIELD.to_string(),
            default_tag: DEFAULT_TAG.to_string(),
            allow_duplicate: false,
            strategy: Strategy::Qa.to_string(),
            extensions: vec!["md".to_string(), "markdown".to_string()],
        }
    }
}

impl Config {
    /// The per-user config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("note2anki").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one the default location is
    /// tried and silently skipped when absent.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.is_file() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        log::debug!("Loaded config from {:?}", path);

        toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Parse the configured card type
    pub fn strategy(&self) -> Result<Strategy, ConfigError> {
        self.strategy.parse()
    }

    pub fn convert_options(&self) -> Result<ConvertOptions, ConfigError> {
        Ok(ConvertOptions {
            deck: self.deck.clone(),
            strategy: self.strategy()?,
            model_name: self.model_name.clone(),
            front_field: self.front_field.clone(),
            back_field: self.back_field.clone(),
            default_tag: self.default_tag.clone(),
            allow_duplicate: self.allow_duplicate,
            extensions: self.extensions.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "deck = \"Biology\"\nstrategy = \"whole\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.deck, "Biology");
        assert_eq!(config.strategy().unwrap(), Strategy::Whole);
        assert_eq!(config.anki_url, DEFAULT_ANKI_URL);
        assert_eq!(config.default_tag, DEFAULT_TAG);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = Config::load(Some(&temp_dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "deck = [unterminated").unwrap();

        assert!(matches!(Config::load(Some(&path)), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        let config = Config {
            strategy: "cloze".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.convert_options(), Err(ConfigError::UnknownStrategy(_))));
    }

    #[test]
    fn test_convert_options() {
        let options = Config::default().convert_options().unwrap();
        assert_eq!(options.strategy, Strategy::Qa);
        assert_eq!(options.model_name, "Basic");
        assert_eq!(options.extensions, vec!["md", "markdown"]);
    }
}
