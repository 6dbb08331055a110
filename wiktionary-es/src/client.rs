//! A client for the English Wiktionary's MediaWiki API.
//!
//! This module provides a high-level async interface for fetching a page's
//! rendered HTML and raw wikitext, and for expanding a conjugation template
//! invocation into structured verb-form data.

use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use reqwest::{ClientBuilder, redirect::Policy};
use serde::Deserialize;
use tracing::debug;

use crate::Error;
use crate::conjugation::VerbForm;

/// The base URL of the wiki.
const BASE_URL: &str = "https://en.wiktionary.org";
/// The relative path of the API endpoint.
const API_PATH: &str = "/w/api.php";
/// The `Api-User-Agent` value identifying this tool to the API.
const API_USER_AGENT: &str = "palabra/0.1 (https://github.com/rymiel/palabra)";

static RE_CONJUGATION_TEMPLATE: OnceLock<Regex> = OnceLock::new();

fn conjugation_template_regex() -> &'static Regex {
    RE_CONJUGATION_TEMPLATE
        .get_or_init(|| Regex::new(r"\{\{es-conj[^{}]*\}\}").expect("conjugation template regex"))
}

/// A fetched page: the rendered HTML the extraction pipeline works on, plus
/// the raw wikitext needed only for the conjugation sub-lookup.
#[derive(Debug, Clone)]
pub struct Page {
    /// The canonical page title.
    pub title: String,
    /// The rendered HTML of the page.
    pub html: String,
    /// The page's raw wikitext, when the API returned it.
    pub wikitext: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: String,
    info: String,
}

#[derive(Debug, Deserialize)]
struct ParseResponse {
    parse: Option<ParsePayload>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ParsePayload {
    title: String,
    text: String,
    wikitext: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExpandResponse {
    expandtemplates: Option<ExpandPayload>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ExpandPayload {
    wikitext: String,
}

/// An asynchronous client for the Wiktionary API.
#[derive(Debug)]
pub struct Client {
    /// The base URL of the wiki.
    base_url: String,
    /// The underlying [`reqwest::Client`] used for making HTTP requests.
    client: reqwest::Client,
}

impl Client {
    /// Constructs a new `Client` with default settings.
    ///
    /// # Panics
    ///
    /// Panics if the underlying HTTP client cannot be built. For a
    /// non-panicking version, see [`Client::try_new`].
    #[must_use]
    pub fn new() -> Client {
        Client::try_new().expect("could not construct http client")
    }

    /// Attempts to construct a new `Client` with default settings: gzip
    /// support, a 30-second timeout, and no redirects.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::BuildClient`] if the underlying `reqwest` client
    /// fails to build.
    pub fn try_new() -> Result<Client, Error> {
        let client = ClientBuilder::new()
            .gzip(true)
            .redirect(Policy::none())
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(Error::BuildClient)?;

        Ok(Self::with_client(client))
    }

    /// Constructs a `Client` using a pre-configured `reqwest::Client`.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Client {
        let base_url = String::from(BASE_URL);

        Client { base_url, client }
    }

    /// Overrides the base URL, e.g. for a local test server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Client {
        self.base_url = base_url.into();

        self
    }

    /// Fetches a page's rendered HTML and wikitext.
    ///
    /// # Errors
    ///
    /// - [`Error::Request`] on transport failures or non-success status codes.
    /// - [`Error::Api`] when the API reports a structured error, such as
    ///   `missingtitle` for a word that has no page.
    /// - [`Error::MalformedResponse`] when the response carries neither a
    ///   result nor an error.
    pub async fn fetch_page(&self, word: &str) -> Result<Page, Error> {
        let response: ParseResponse = self
            .get(&[
                ("action", "parse"),
                ("page", word),
                ("prop", "text|wikitext"),
                ("formatversion", "2"),
                ("format", "json"),
            ])
            .await?;

        if let Some(error) = response.error {
            return Err(Error::Api {
                code: error.code,
                info: error.info,
            });
        }
        let payload = response
            .parse
            .ok_or(Error::MalformedResponse("missing parse payload"))?;

        Ok(Page {
            title: payload.title,
            html: payload.text,
            wikitext: payload.wikitext,
        })
    }

    /// Expands the page's conjugation template into verb-form data keyed by
    /// grammatical-form identifier.
    ///
    /// Returns `Ok(None)` when the wikitext contains no conjugation template;
    /// that is the normal outcome for non-verbs.
    ///
    /// # Errors
    ///
    /// - [`Error::Request`] on transport failures.
    /// - [`Error::Api`] when the API reports a structured error.
    /// - [`Error::Json`] when the expanded payload is not the expected shape.
    pub async fn expand_conjugation(
        &self,
        title: &str,
        wikitext: &str,
    ) -> Result<Option<BTreeMap<String, Vec<VerbForm>>>, Error> {
        let Some(invocation) = conjugation_template_regex().find(wikitext) else {
            debug!(title, "no conjugation template in wikitext");

            return Ok(None);
        };

        // Re-expand the matched invocation through the module's JSON view so
        // the forms come back tagged by grammatical person instead of being
        // scraped out of table positions.
        let inner = invocation
            .as_str()
            .trim_start_matches("{{")
            .trim_end_matches("}}");
        let wrapped = format!("{{{{#invoke:es-verbs|json|{inner}}}}}");

        let response: ExpandResponse = self
            .get(&[
                ("action", "expandtemplates"),
                ("title", title),
                ("text", &wrapped),
                ("prop", "wikitext"),
                ("formatversion", "2"),
                ("format", "json"),
            ])
            .await?;

        if let Some(error) = response.error {
            return Err(Error::Api {
                code: error.code,
                info: error.info,
            });
        }
        let payload = response
            .expandtemplates
            .ok_or(Error::MalformedResponse("missing expandtemplates payload"))?;

        let forms = serde_json::from_str(&payload.wikitext)?;

        Ok(Some(forms))
    }

    async fn get<T>(&self, params: &[(&str, &str)]) -> Result<T, Error>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{base_url}{API_PATH}", base_url = self.base_url);
        let request = self
            .client
            .get(url)
            .header("Api-User-Agent", API_USER_AGENT)
            .query(params);
        let response = request.send().await.map_err(Error::Request)?;

        match response.error_for_status() {
            Ok(response) => response.json().await.map_err(Error::Request),
            Err(err) => Err(Error::Request(err)),
        }
    }
}

impl Default for Client {
    /// Creates a default `Client` instance.
    ///
    /// This is equivalent to calling [`Client::new`].
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_client() {
        let http_client = reqwest::Client::new();
        let _ = Client::with_client(http_client);
    }

    #[test]
    fn conjugation_template_is_matched() {
        let wikitext = "===Conjugation===\n{{es-conj|hablar|-ar}}\n";

        let matched = conjugation_template_regex().find(wikitext).unwrap();
        assert_eq!(matched.as_str(), "{{es-conj|hablar|-ar}}");
    }

    #[test]
    fn absent_template_is_not_matched() {
        assert!(
            conjugation_template_regex()
                .find("just a noun entry")
                .is_none()
        );
    }
}
