use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::cards::{CardPair, Strategy};
use crate::markdown::{Frontmatter, FrontmatterError};

#[derive(Error, Debug)]
pub enum NoteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed front-matter: {0}")]
    Frontmatter(#[from] FrontmatterError),
}

/// A note as read from disk
#[derive(Debug, Clone)]
pub struct Note {
    /// File name, used only as a title fallback
    name: Option<String>,
    text: String,
    frontmatter: Frontmatter,
}

impl Note {
    /// Parse note text. Front-matter must be valid YAML if present.
    pub fn parse(text: impl Into<String>, name: Option<&str>) -> Result<Self, NoteError> {
        let text = text.into();
        let frontmatter = Frontmatter::parse(&text)?;

        Ok(Self {
            name: name.map(str::to_string),
            text,
            frontmatter,
        })
    }

    /// Read and parse a note file
    pub fn load(path: &Path) -> Result<Self, NoteError> {
        let text = fs::read_to_string(path)?;
        let name = path.file_name().map(|n| n.to_string_lossy().to_string());
        Self::parse(text, name.as_deref())
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Front-matter tags, or `default_tag` when the note declares none
    pub fn tags(&self, default_tag: &str) -> Vec<String> {
        let tags = self.frontmatter.tags();
        if tags.is_empty() && !default_tag.is_empty() {
            vec![default_tag.to_string()]
        } else {
            tags
        }
    }

    pub fn extract(&self, strategy: Strategy) -> Vec<CardPair> {
        strategy.extract(&self.text, self.name.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_tag_when_none_declared() {
        let note = Note::parse("# Title\nBody", None).unwrap();
        assert_eq!(note.tags("obsidian"), vec!["obsidian"]);
    }

    #[test]
    fn test_frontmatter_tags_replace_default() {
        let note = Note::parse("---\ntags: [bio, cells]\n---\n# Title\nBody", None).unwrap();
        assert_eq!(note.tags("obsidian"), vec!["bio", "cells"]);
    }

    #[test]
    fn test_malformed_frontmatter_is_note_error() {
        let err = Note::parse("---\ntags: [oops\n---\n# T\nB", None).unwrap_err();
        assert!(matches!(err, NoteError::Frontmatter(_)));
    }

    #[test]
    fn test_load_uses_file_name() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cell_biology.md");
        fs::write(&path, "No heading here.").unwrap();

        let note = Note::load(&path).unwrap();
        assert_eq!(note.name(), Some("cell_biology.md"));
        assert_eq!(
            note.extract(Strategy::Whole),
            vec![CardPair::new("Cell Biology", "No heading here.")]
        );
    }

    #[test]
    fn test_load_rejects_invalid_utf8() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("binary.md");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        assert!(matches!(Note::load(&path), Err(NoteError::Io(_))));
    }
}
