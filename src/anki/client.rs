use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use super::models::{AddNoteParams, AnkiNote, AnkiRequest, AnkiResponse};

/// AnkiConnect API version spoken by this client
pub const ANKI_CONNECT_VERSION: u8 = 6;

#[derive(Error, Debug)]
pub enum AnkiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("AnkiConnect error on {action}: {message}")]
    Api { action: String, message: String },

    #[error("Unexpected AnkiConnect response to {0}")]
    InvalidResponse(String),

    /// Anki refused a single note (duplicate, empty field, unknown model...)
    #[error("Note rejected: {0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, AnkiError>;

impl AnkiError {
    /// Per-note refusals are recoverable; everything else means Anki cannot
    /// be talked to.
    pub fn is_rejection(&self) -> bool {
        matches!(self, AnkiError::Rejected(_))
    }
}

/// Destination for rendered notes
pub trait NoteSink {
    /// Submit one note, returning the new note id
    fn add_note(&self, note: &AnkiNote) -> Result<i64>;
}

/// Blocking AnkiConnect client
pub struct AnkiClient {
    client: Client,
    url: String,
}

impl AnkiClient {
    /// Create a client for an AnkiConnect endpoint (e.g. `http://localhost:8765`)
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into().trim_end_matches('/').to_string();

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AnkiError::InvalidUrl(format!(
                "{} (URL must start with http:// or https://)",
                url
            )));
        }

        // AnkiConnect is local; never route it through a system proxy
        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST one action and decode the envelope. Only transport and decoding
    /// failures are errors here.
    fn invoke<P: Serialize, T: DeserializeOwned>(
        &self,
        action: &str,
        params: P,
    ) -> Result<AnkiResponse<T>> {
        log::debug!("AnkiConnect {} -> {}", action, self.url);

        let request = AnkiRequest {
            action,
            version: ANKI_CONNECT_VERSION,
            params,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()?
            .error_for_status()?;

        Ok(response.json()?)
    }

    /// Invoke an action whose error reply is fatal
    fn call<P: Serialize, T: DeserializeOwned>(&self, action: &str, params: P) -> Result<T> {
        let response: AnkiResponse<T> = self.invoke(action, params)?;

        if let Some(message) = response.error {
            return Err(AnkiError::Api {
                action: action.to_string(),
                message,
            });
        }

        response
            .result
            .ok_or_else(|| AnkiError::InvalidResponse(action.to_string()))
    }

    /// AnkiConnect's API version. Doubles as a check that Anki is running.
    pub fn version(&self) -> Result<u32> {
        self.call("version", json!({}))
    }

    pub fn deck_names(&self) -> Result<Vec<String>> {
        self.call("deckNames", json!({}))
    }

    /// Create a deck, returning its id. Creating an existing deck is a no-op
    /// on Anki's side.
    pub fn create_deck(&self, name: &str) -> Result<i64> {
        self.call("createDeck", json!({ "deck": name }))
    }

    /// Create `name` unless it already exists. Returns true if it was created.
    pub fn ensure_deck_exists(&self, name: &str) -> Result<bool> {
        if self.deck_names()?.iter().any(|deck| deck == name) {
            return Ok(false);
        }

        let id = self.create_deck(name)?;
        log::info!("Created deck '{}' ({})", name, id);
        Ok(true)
    }

    /// Add one note. An error reply from Anki is a [`AnkiError::Rejected`].
    pub fn add_note(&self, note: &AnkiNote) -> Result<i64> {
        let response: AnkiResponse<i64> = self.invoke("addNote", AddNoteParams { note })?;

        match (response.result, response.error) {
            (_, Some(message)) => Err(AnkiError::Rejected(message)),
            (Some(id), None) => Ok(id),
            (None, None) => Err(AnkiError::Rejected("AnkiConnect returned no note id".to_string())),
        }
    }
}

impl NoteSink for AnkiClient {
    fn add_note(&self, note: &AnkiNote) -> Result<i64> {
        AnkiClient::add_note(self, note)
    }
}
