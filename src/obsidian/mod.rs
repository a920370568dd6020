//! Obsidian vault conversion
//!
//! Turns a single note or a whole vault directory into Anki notes:
//! - Markdown files with YAML front-matter
//! - Nested folders (hidden entries and `.obsidian` config skipped)
//! - Front-matter `tags` carried over to Anki

mod note;
mod walker;

pub use note::*;
pub use walker::*;
