use thiserror::Error;

/// Error.
#[derive(Debug, Error)]
pub enum Error {
    /// The underlying HTTP client could not be constructed.
    #[cfg(feature = "client")]
    #[error("could not construct http client: {0}")]
    BuildClient(#[source] reqwest::Error),
    /// A request failed at the transport level.
    #[cfg(feature = "client")]
    #[error("request error: {0}")]
    Request(#[source] reqwest::Error),
    /// The MediaWiki API returned a structured error object.
    ///
    /// Surfaced verbatim to the user, code and message.
    #[cfg(feature = "client")]
    #[error("api error ({code}): {info}")]
    Api {
        /// Machine-readable error code, e.g. `missingtitle`.
        code: String,
        /// Human-readable message.
        info: String,
    },
    /// The API response deserialized but carried neither a result nor an
    /// error object.
    #[cfg(feature = "client")]
    #[error("malformed api response: {0}")]
    MalformedResponse(&'static str),
    /// A JSON payload could not be decoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// The page exists but has no section for the requested language.
    ///
    /// This is a common, recoverable outcome, not a failure of the lookup
    /// machinery.
    #[error("no {language} section in this entry")]
    LanguageNotFound {
        /// The language whose section was requested.
        language: String,
    },
    /// A scope was requested for a node that is not a heading.
    ///
    /// This is a contract violation in the caller, not a property of the
    /// input document.
    #[error("cannot delimit a section from a non-heading node")]
    NotAHeading,
}
