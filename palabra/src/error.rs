//! Error types

use miette::Diagnostic;
use thiserror::Error;

/// Application errors for configuration, lookups, and integrations.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The configuration file could not be loaded or merged.
    #[error("could not load configuration")]
    Config(#[source] Box<figment::Error>),
    /// The configured wiki base URL does not parse.
    #[error("invalid wiki base url: {0}")]
    BaseUrl(#[source] url::ParseError),
    /// A lookup failed inside the extraction engine or its client.
    #[error("lookup failed: {0}")]
    Lookup(#[from] wiktionary_es::Error),
    /// A flashcard request failed at the transport level.
    #[error("flashcard request failed")]
    AnkiRequest(#[source] reqwest::Error),
    /// The flashcard service reported an error.
    #[error("flashcard service error: {0}")]
    AnkiRpc(String),
    /// The word-frequency list could not be read.
    #[error("could not read frequency list")]
    FrequencyList(#[source] std::io::Error),
    /// Reading queries from standard input failed.
    #[error("input error")]
    Io(#[from] std::io::Error),
}
