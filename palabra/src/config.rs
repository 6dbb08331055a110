//! Configuration, merged from defaults, a TOML file, and the environment.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use url::Url;
use wiktionary_es::EntryOptions;
use wiktionary_es::pronunciation::DEFAULT_DIALECT_MARKERS;

use crate::error::Error;

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Wiki endpoint and extraction configuration
    #[serde(default)]
    pub wiki: WikiConfig,
    /// Presentation options
    #[serde(default)]
    pub display: DisplayConfig,
    /// Flashcard integration configuration
    #[serde(default)]
    pub anki: AnkiConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WikiConfig {
    /// Base URL of the wiki the entries come from.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// The language section to extract for word lookups.
    #[serde(default = "default_language")]
    pub language: String,
    /// The language section translation tables are read from.
    #[serde(default = "default_translation_language")]
    pub translation_language: String,
    /// Regional labels used to pick among pronunciation candidates.
    #[serde(default = "default_dialect_markers")]
    pub dialect_markers: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Render only headings, definitions and the quick table.
    #[serde(default)]
    pub compact: bool,
    /// Optional word-frequency list, one word per line, rank by position.
    #[serde(default)]
    pub frequency_list: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AnkiConfig {
    /// Enable the flashcard integration.
    #[serde(default)]
    pub enabled: bool,
    /// The AnkiConnect endpoint.
    #[serde(default = "default_anki_endpoint")]
    pub endpoint: String,
    /// The deck new notes are created in.
    #[serde(default = "default_anki_deck")]
    pub deck: String,
    /// The note model new notes use.
    #[serde(default = "default_anki_model")]
    pub model: String,
    /// Tags attached to created notes.
    #[serde(default = "default_anki_tags")]
    pub tags: Vec<String>,
}

impl Default for WikiConfig {
    fn default() -> Self {
        WikiConfig {
            base_url: default_base_url(),
            language: default_language(),
            translation_language: default_translation_language(),
            dialect_markers: default_dialect_markers(),
        }
    }
}

impl Default for AnkiConfig {
    fn default() -> Self {
        AnkiConfig {
            enabled: false,
            endpoint: default_anki_endpoint(),
            deck: default_anki_deck(),
            model: default_anki_model(),
            tags: default_anki_tags(),
        }
    }
}

impl Config {
    /// Loads the configuration: compiled defaults, then the TOML file at
    /// `path` (which may be absent), then `PALABRA_*` environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Config, Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("PALABRA_").split("__"))
            .extract()
            .map_err(|err| Error::Config(Box::new(err)))
    }

    /// Extraction options for word lookups.
    pub fn entry_options(&self) -> Result<EntryOptions, Error> {
        Ok(EntryOptions {
            language: self.wiki.language.clone(),
            dialect_markers: self.wiki.dialect_markers.clone(),
            origin: self.origin()?,
        })
    }

    /// Extraction options for translation lookups.
    pub fn translation_options(&self) -> Result<EntryOptions, Error> {
        Ok(EntryOptions {
            language: self.wiki.translation_language.clone(),
            dialect_markers: self.wiki.dialect_markers.clone(),
            origin: self.origin()?,
        })
    }

    fn origin(&self) -> Result<Url, Error> {
        Url::parse(&self.wiki.base_url).map_err(Error::BaseUrl)
    }
}

fn default_base_url() -> String {
    String::from("https://en.wiktionary.org")
}

fn default_language() -> String {
    String::from("Spanish")
}

fn default_translation_language() -> String {
    String::from("English")
}

fn default_dialect_markers() -> Vec<String> {
    DEFAULT_DIALECT_MARKERS
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn default_anki_endpoint() -> String {
    String::from("http://127.0.0.1:8765")
}

fn default_anki_deck() -> String {
    String::from("Spanish")
}

fn default_anki_model() -> String {
    String::from("Basic")
}

fn default_anki_tags() -> Vec<String> {
    vec![String::from("palabra")]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable_without_a_config_file() {
        let config = Config::default();

        assert_eq!(config.wiki.language, "Spanish");
        assert_eq!(config.wiki.translation_language, "English");
        assert!(!config.anki.enabled);
        assert!(!config.display.compact);

        let options = config.entry_options().unwrap();
        assert_eq!(options.origin.as_str(), "https://en.wiktionary.org/");
        assert_eq!(options.dialect_markers.len(), 2);
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let config = Config {
            wiki: WikiConfig {
                base_url: String::from("not a url"),
                ..WikiConfig::default()
            },
            ..Config::default()
        };

        assert!(matches!(config.entry_options(), Err(Error::BaseUrl(_))));
    }
}
