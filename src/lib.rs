//! Markdown notes to Anki flashcards.
//!
//! The pipeline reads a note (or a whole vault directory), splits it into
//! front/back pairs with a selectable [`Strategy`], renders each field to HTML
//! with math shielded from the Markdown renderer, and submits the result to
//! Anki through AnkiConnect.

pub mod anki;
pub mod cards;
pub mod config;
pub mod markdown;
pub mod math;
pub mod obsidian;

pub use anki::{AnkiClient, AnkiError, AnkiNote, NoteSink};
pub use cards::{CardPair, RenderedCard, Strategy};
pub use config::{Config, ConfigError};
pub use obsidian::{ConvertError, ConvertOptions, ConvertReport, Converter, NoteError, NoteOutcome};
