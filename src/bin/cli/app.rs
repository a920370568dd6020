use std::path::Path;

use anyhow::{Context, Result};

use note2anki_lib::anki::AnkiClient;
use note2anki_lib::config::Config;
use note2anki_lib::obsidian::ConvertOptions;

/// Command-line values that take precedence over the config file
#[derive(Debug, Default)]
pub struct Overrides {
    pub card_type: Option<String>,
    pub deck: Option<String>,
    pub url: Option<String>,
    pub allow_duplicates: bool,
}

/// Shared application state for CLI commands
pub struct App {
    pub config: Config,
    pub options: ConvertOptions,
}

impl App {
    /// Load configuration and apply command-line overrides. Any configuration
    /// problem, including an unknown card type, stops the run here.
    pub fn new(config_path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let mut config = Config::load(config_path).context("Failed to load configuration")?;

        if let Some(card_type) = overrides.card_type {
            config.strategy = card_type;
        }
        if let Some(deck) = overrides.deck {
            config.deck = deck;
        }
        if let Some(url) = overrides.url {
            config.anki_url = url;
        }
        if overrides.allow_duplicates {
            config.allow_duplicate = true;
        }

        let options = config
            .convert_options()
            .context("Invalid configuration")?;

        Ok(Self { config, options })
    }

    pub fn client(&self) -> Result<AnkiClient> {
        AnkiClient::new(self.config.anki_url.as_str())
            .with_context(|| format!("Invalid AnkiConnect URL '{}'", self.config.anki_url))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use note2anki_lib::cards::Strategy;
    use tempfile::TempDir;

    fn config_file(content: &str) -> (TempDir, std::path::PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, content).unwrap();
        (temp_dir, path)
    }

    #[test]
    fn test_overrides_win_over_file() {
        let (_dir, path) = config_file("deck = \"From File\"\nstrategy = \"whole\"\n");

        let app = App::new(
            Some(&path),
            Overrides {
                card_type: Some("qa".to_string()),
                deck: Some("From Flag".to_string()),
                allow_duplicates: true,
                ..Overrides::default()
            },
        )
        .unwrap();

        assert_eq!(app.options.deck, "From Flag");
        assert_eq!(app.options.strategy, Strategy::Qa);
        assert!(app.options.allow_duplicate);
    }

    #[test]
    fn test_unknown_card_type_is_fatal() {
        let (_dir, path) = config_file("");
        let overrides = Overrides {
            card_type: Some("cloze".to_string()),
            ..Overrides::default()
        };

        let err = App::new(Some(&path), overrides).err().unwrap();
        assert!(format!("{:#}", err).contains("cloze"));
    }
}
