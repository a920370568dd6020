//! AnkiConnect delivery
//!
//! Anki is driven through the AnkiConnect add-on's local JSON API. Only the
//! handful of actions the converter needs are wrapped:
//! - `version` (reachability probe)
//! - `deckNames` / `createDeck`
//! - `addNote`

mod client;
mod models;

pub use client::{AnkiClient, AnkiError, NoteSink, Result, ANKI_CONNECT_VERSION};
pub use models::*;
