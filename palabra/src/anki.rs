//! Minimal AnkiConnect client used to push looked-up words into a deck.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::config::AnkiConfig;
use crate::error::Error;

/// The AnkiConnect protocol version this client speaks.
const PROTOCOL_VERSION: u32 = 6;

#[derive(Debug, Serialize)]
struct RpcRequest<'a, P: Serialize> {
    action: &'a str,
    version: u32,
    params: P,
}

#[derive(Debug, serde::Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<String>,
}

/// Client for a locally running AnkiConnect endpoint.
#[derive(Debug, Clone)]
pub struct AnkiClient {
    endpoint: String,
    deck: String,
    model: String,
    tags: Vec<String>,
    client: reqwest::Client,
}

impl AnkiClient {
    #[must_use]
    pub fn new(config: &AnkiConfig) -> AnkiClient {
        AnkiClient {
            endpoint: config.endpoint.clone(),
            deck: config.deck.clone(),
            model: config.model.clone(),
            tags: config.tags.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// Checks that the endpoint is reachable and speaks a compatible protocol
    /// version. AnkiConnect shows its permission prompt on first contact, so
    /// this is called once at startup rather than on the first note.
    pub async fn probe(&self) -> Result<(), Error> {
        let version: u32 = self.call("version", json!({})).await?;
        debug!(%version, "anki-connect reachable");

        Ok(())
    }

    /// Returns whether a note for `word` already exists in the configured deck.
    pub async fn has_note(&self, word: &str) -> Result<bool, Error> {
        let query = search_query(&self.deck, word);
        let ids: Vec<u64> = self.call("findNotes", json!({ "query": query })).await?;

        Ok(!ids.is_empty())
    }

    /// Adds a note with the word on the front and its rendered meaning on the
    /// back.
    pub async fn add_note(&self, word: &str, meaning: &str) -> Result<(), Error> {
        let params = json!({
            "note": {
                "deckName": self.deck,
                "modelName": self.model,
                "fields": { "Front": word, "Back": meaning },
                "tags": self.tags,
            }
        });
        let id: u64 = self.call("addNote", params).await?;
        debug!(%word, %id, "added note");

        Ok(())
    }

    async fn call<T, P>(&self, action: &str, params: P) -> Result<T, Error>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        let request = RpcRequest {
            action,
            version: PROTOCOL_VERSION,
            params,
        };
        let response: RpcResponse<T> = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(Error::AnkiRequest)?
            .error_for_status()
            .map_err(Error::AnkiRequest)?
            .json()
            .await
            .map_err(Error::AnkiRequest)?;

        if let Some(message) = response.error {
            return Err(Error::AnkiRpc(message));
        }

        response
            .result
            .ok_or_else(|| Error::AnkiRpc(format!("empty result for {action}")))
    }
}

/// Builds the duplicate-check search. Backslashes and quotes in the searched
/// values are escaped so they cannot break out of the quoted terms.
fn search_query(deck: &str, word: &str) -> String {
    fn escape(term: &str) -> String {
        term.replace('\\', "\\\\").replace('"', "\\\"")
    }

    format!("deck:\"{}\" Front:\"{}\"", escape(deck), escape(word))
}
