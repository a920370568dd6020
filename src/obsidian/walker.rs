//! Vault walking and note conversion
//!
//! Each note is read, split into cards, rendered, and submitted before the
//! next one is touched. In directory mode a broken note is recorded and
//! skipped; in single-file mode it is returned as an error.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use walkdir::WalkDir;

use super::note::{Note, NoteError};
use crate::anki::{AnkiError, AnkiNote, NoteOptions, NoteSink};
use crate::cards::{RenderedCard, Strategy};
use crate::config::{DEFAULT_BACK_FIELD, DEFAULT_FRONT_FIELD, DEFAULT_MODEL, DEFAULT_TAG};
use crate::markdown::render_card;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("{} does not exist", .0.display())]
    PathNotFound(PathBuf),

    #[error("Failed to process {}: {}", .path.display(), .source)]
    Note {
        path: PathBuf,
        #[source]
        source: NoteError,
    },

    #[error("Delivery failed: {0}")]
    Delivery(#[from] AnkiError),
}

/// Settings for one conversion run
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub deck: String,
    pub strategy: Strategy,
    pub model_name: String,
    pub front_field: String,
    pub back_field: String,
    pub default_tag: String,
    pub allow_duplicate: bool,
    /// File suffixes treated as notes, without the dot
    pub extensions: Vec<String>,
}

impl ConvertOptions {
    pub fn new(deck: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            deck: deck.into(),
            strategy,
            model_name: DEFAULT_MODEL.to_string(),
            front_field: DEFAULT_FRONT_FIELD.to_string(),
            back_field: DEFAULT_BACK_FIELD.to_string(),
            default_tag: DEFAULT_TAG.to_string(),
            allow_duplicate: false,
            extensions: vec!["md".to_string(), "markdown".to_string()],
        }
    }

    /// Build the `addNote` payload for a rendered card
    pub fn anki_note(&self, card: &RenderedCard, tags: &[String]) -> AnkiNote {
        AnkiNote {
            deck_name: self.deck.clone(),
            model_name: self.model_name.clone(),
            fields: BTreeMap::from([
                (self.front_field.clone(), card.front.clone()),
                (self.back_field.clone(), card.back.clone()),
            ]),
            options: NoteOptions {
                allow_duplicate: self.allow_duplicate,
            },
            tags: tags.to_vec(),
        }
    }
}

/// A note ready for submission
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedNote {
    pub path: PathBuf,
    pub tags: Vec<String>,
    pub cards: Vec<RenderedCard>,
}

/// A card Anki refused
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRejection {
    /// Position of the card within its note
    pub index: usize,
    pub reason: String,
}

/// Result of converting one note
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum NoteOutcome {
    Converted {
        path: PathBuf,
        added: usize,
        rejected: Vec<CardRejection>,
    },
    Failed {
        path: PathBuf,
        reason: String,
    },
}

impl NoteOutcome {
    pub fn path(&self) -> &Path {
        match self {
            NoteOutcome::Converted { path, .. } | NoteOutcome::Failed { path, .. } => path,
        }
    }

    pub fn added(&self) -> usize {
        match self {
            NoteOutcome::Converted { added, .. } => *added,
            NoteOutcome::Failed { .. } => 0,
        }
    }
}

/// Per-note outcomes of a run, in walk order
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertReport {
    pub outcomes: Vec<NoteOutcome>,
}

impl ConvertReport {
    /// Cards Anki accepted
    pub fn cards_added(&self) -> usize {
        self.outcomes.iter().map(NoteOutcome::added).sum()
    }

    pub fn cards_rejected(&self) -> usize {
        self.outcomes
            .iter()
            .map(|outcome| match outcome {
                NoteOutcome::Converted { rejected, .. } => rejected.len(),
                NoteOutcome::Failed { .. } => 0,
            })
            .sum()
    }

    pub fn failed_notes(&self) -> impl Iterator<Item = &NoteOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, NoteOutcome::Failed { .. }))
    }
}

/// Prepared notes of a dry run, plus the notes that could not be read
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub notes: Vec<PreparedNote>,
    pub failures: Vec<NoteOutcome>,
}

impl Collection {
    pub fn card_count(&self) -> usize {
        self.notes.iter().map(|note| note.cards.len()).sum()
    }
}

/// All note files below `root`, sorted by path
pub fn collect_note_paths(root: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry under {:?}: {}", root, e);
                continue;
            }
        };

        if entry.file_type().is_file() && has_note_extension(entry.path(), extensions) {
            paths.push(entry.into_path());
        }
    }

    paths
}

/// Hidden files and folders, `.obsidian` config included
fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn has_note_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy())
        .is_some_and(|ext| extensions.iter().any(|wanted| wanted.eq_ignore_ascii_case(&ext)))
}

/// Read one note, split it into cards and render them
pub fn prepare_note(path: &Path, options: &ConvertOptions) -> Result<PreparedNote, NoteError> {
    let note = Note::load(path)?;
    let cards = note
        .extract(options.strategy)
        .iter()
        .map(render_card)
        .collect();

    Ok(PreparedNote {
        path: path.to_path_buf(),
        tags: note.tags(&options.default_tag),
        cards,
    })
}

/// Prepare a note file or every note below a directory without submitting
/// anything. Directory mode records unreadable notes as failures.
pub fn collect_path(path: &Path, options: &ConvertOptions) -> Result<Collection, ConvertError> {
    let mut collection = Collection::default();

    if path.is_file() {
        let note = prepare_note(path, options).map_err(|source| ConvertError::Note {
            path: path.to_path_buf(),
            source,
        })?;
        collection.notes.push(note);
        return Ok(collection);
    }

    if !path.is_dir() {
        return Err(ConvertError::PathNotFound(path.to_path_buf()));
    }

    for note_path in collect_note_paths(path, &options.extensions) {
        match prepare_note(&note_path, options) {
            Ok(note) => collection.notes.push(note),
            Err(e) => {
                log::warn!("Skipping {:?}: {}", note_path, e);
                collection.failures.push(NoteOutcome::Failed {
                    path: note_path,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(collection)
}

/// Converts notes and submits them to a [`NoteSink`]
pub struct Converter<'a, S: NoteSink> {
    sink: &'a S,
    options: ConvertOptions,
}

impl<'a, S: NoteSink> Converter<'a, S> {
    pub fn new(sink: &'a S, options: ConvertOptions) -> Self {
        Self { sink, options }
    }

    /// Convert a file or a directory tree
    pub fn convert_path(&self, path: &Path) -> Result<ConvertReport, ConvertError> {
        if path.is_file() {
            let outcome = self.convert_file(path)?;
            Ok(ConvertReport {
                outcomes: vec![outcome],
            })
        } else if path.is_dir() {
            self.convert_directory(path)
        } else {
            Err(ConvertError::PathNotFound(path.to_path_buf()))
        }
    }

    /// Convert one note. Unreadable notes are errors.
    pub fn convert_file(&self, path: &Path) -> Result<NoteOutcome, ConvertError> {
        log::info!("Processing {:?}", path);

        let prepared = prepare_note(path, &self.options).map_err(|source| ConvertError::Note {
            path: path.to_path_buf(),
            source,
        })?;

        self.submit(prepared)
    }

    /// Convert every note below `dir`. Notes that cannot be read are recorded
    /// as failed and skipped; losing Anki aborts the run.
    pub fn convert_directory(&self, dir: &Path) -> Result<ConvertReport, ConvertError> {
        if !dir.is_dir() {
            return Err(ConvertError::PathNotFound(dir.to_path_buf()));
        }

        let mut report = ConvertReport::default();

        for path in collect_note_paths(dir, &self.options.extensions) {
            match self.convert_file(&path) {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(ConvertError::Note { path, source }) => {
                    log::warn!("Skipping {:?}: {}", path, source);
                    report.outcomes.push(NoteOutcome::Failed {
                        path,
                        reason: source.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }

    fn submit(&self, prepared: PreparedNote) -> Result<NoteOutcome, ConvertError> {
        let mut added = 0;
        let mut rejected = Vec::new();

        for (index, card) in prepared.cards.iter().enumerate() {
            let note = self.options.anki_note(card, &prepared.tags);

            match self.sink.add_note(&note) {
                Ok(id) => {
                    log::debug!("Added card {} of {:?} as note {}", index + 1, prepared.path, id);
                    added += 1;
                }
                Err(e) if e.is_rejection() => {
                    log::warn!("Card {} of {:?} rejected: {}", index + 1, prepared.path, e);
                    rejected.push(CardRejection {
                        index,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(ConvertError::Delivery(e)),
            }
        }

        Ok(NoteOutcome::Converted {
            path: prepared.path,
            added,
            rejected,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs;

    use super::*;
    use tempfile::TempDir;

    /// Records submitted notes; rejects any whose front mentions "duplicate"
    #[derive(Default)]
    struct RecordingSink {
        notes: RefCell<Vec<AnkiNote>>,
        offline: bool,
    }

    impl NoteSink for RecordingSink {
        fn add_note(&self, note: &AnkiNote) -> Result<i64, AnkiError> {
            if self.offline {
                return Err(AnkiError::InvalidResponse("addNote".to_string()));
            }
            if note.fields.get("Front").is_some_and(|f| f.contains("duplicate")) {
                return Err(AnkiError::Rejected("cannot create note because it is a duplicate".to_string()));
            }
            let mut notes = self.notes.borrow_mut();
            notes.push(note.clone());
            Ok(notes.len() as i64)
        }
    }

    fn write(dir: &Path, relative: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    fn whole_options() -> ConvertOptions {
        ConvertOptions::new("Test Deck", Strategy::Whole)
    }

    #[test]
    fn test_collect_note_paths_recurses_and_filters() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "b.md", b"# B");
        write(root, "a/nested/c.markdown", b"# C");
        write(root, "a/image.png", b"png");
        write(root, ".obsidian/workspace.md", b"# hidden");
        write(root, ".trash/old.md", b"# hidden");

        let paths = collect_note_paths(root, &whole_options().extensions);
        let relative: Vec<_> = paths
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(relative, vec!["a/nested/c.markdown", "b.md"]);
    }

    #[test]
    fn test_directory_skips_broken_notes() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "one.md", b"# One\nFirst body");
        write(root, "sub/two.md", b"# Two\nSecond body");
        write(root, "sub/deeper/three.md", b"# Three\nThird body");
        write(root, "unreadable.md", &[0xff, 0xfe, 0xfd]);
        write(root, "bad-meta.md", b"---\ntags: [oops\n---\n# Bad\nbody");

        let sink = RecordingSink::default();
        let converter = Converter::new(&sink, whole_options());
        let report = converter.convert_path(root).unwrap();

        assert_eq!(report.cards_added(), 3);
        assert_eq!(report.failed_notes().count(), 2);
        assert_eq!(sink.notes.borrow().len(), 3);
    }

    #[test]
    fn test_single_file_error_propagates() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(temp_dir.path(), "unreadable.md", &[0xff, 0xfe]);

        let sink = RecordingSink::default();
        let converter = Converter::new(&sink, whole_options());

        assert!(matches!(
            converter.convert_path(&path),
            Err(ConvertError::Note { .. })
        ));
    }

    #[test]
    fn test_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        let sink = RecordingSink::default();
        let converter = Converter::new(&sink, whole_options());

        assert!(matches!(
            converter.convert_path(&temp_dir.path().join("missing")),
            Err(ConvertError::PathNotFound(_))
        ));
    }

    #[test]
    fn test_rejected_cards_do_not_stop_note() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(
            temp_dir.path(),
            "qa.md",
            b"# Deck\n## A duplicate question\nanswer\n## Fresh question\nanswer",
        );

        let sink = RecordingSink::default();
        let converter = Converter::new(&sink, ConvertOptions::new("Test Deck", Strategy::Qa));
        let report = converter.convert_path(&path).unwrap();

        assert_eq!(report.cards_added(), 1);
        assert_eq!(report.cards_rejected(), 1);
        match &report.outcomes[0] {
            NoteOutcome::Converted { rejected, .. } => assert_eq!(rejected[0].index, 0),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_lost_connection_aborts_directory() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "one.md", b"# One\nbody");
        write(temp_dir.path(), "two.md", b"# Two\nbody");

        let sink = RecordingSink {
            offline: true,
            ..RecordingSink::default()
        };
        let converter = Converter::new(&sink, whole_options());

        assert!(matches!(
            converter.convert_path(temp_dir.path()),
            Err(ConvertError::Delivery(_))
        ));
    }

    #[test]
    fn test_submitted_note_payload() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(
            temp_dir.path(),
            "physics.md",
            b"---\ntags: physics, relativity\n---\n# Mass-energy\nThe formula is $E = mc^2$",
        );

        let sink = RecordingSink::default();
        let converter = Converter::new(&sink, whole_options());
        converter.convert_file(&path).unwrap();

        let notes = sink.notes.borrow();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].deck_name, "Test Deck");
        assert_eq!(notes[0].model_name, "Basic");
        assert_eq!(notes[0].tags, vec!["physics", "relativity"]);
        assert_eq!(notes[0].fields["Front"], "<p>Mass-energy</p>");
        assert_eq!(notes[0].fields["Back"], r"<p>The formula is \(E = mc^2\)</p>");
        assert!(!notes[0].options.allow_duplicate);
    }

    #[test]
    fn test_default_tag_applied() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(temp_dir.path(), "plain.md", b"# Plain\nbody");

        let prepared = prepare_note(&path, &whole_options()).unwrap();
        assert_eq!(prepared.tags, vec!["obsidian"]);
        assert_eq!(prepared.cards.len(), 1);
    }

    #[test]
    fn test_collect_path_dry_run() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "one.md", b"# One\nbody");
        write(temp_dir.path(), "two.md", b"no heading, name fallback");
        write(temp_dir.path(), "broken.md", &[0xff]);

        let collection = collect_path(temp_dir.path(), &whole_options()).unwrap();
        assert_eq!(collection.card_count(), 2);
        assert_eq!(collection.failures.len(), 1);
        assert_eq!(collection.failures[0].path().file_name().unwrap(), "broken.md");
    }
}
