//! Whole-note extraction: the note title on the front, the note on the back

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{join_trimmed, CardPair};
use crate::markdown::fences::FenceTracker;
use crate::markdown::split_frontmatter;

static TITLE_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[ \t]+(.*\S)").expect("valid title heading pattern"));

/// Build at most one card from a note.
///
/// The first `# Title` line is the front and everything after it the back.
/// Without a title the front is derived from `name`; without either, the note
/// produces nothing.
pub fn extract(text: &str, name: Option<&str>) -> Vec<CardPair> {
    let (_, body) = split_frontmatter(text);
    let lines: Vec<&str> = body.lines().collect();

    let mut fences = FenceTracker::new();
    for (idx, line) in lines.iter().enumerate() {
        if fences.observe(line) {
            continue;
        }
        if let Some(caps) = TITLE_HEADING.captures(line) {
            let title = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
            return vec![CardPair::new(title, join_trimmed(&lines[idx + 1..]))];
        }
    }

    match name.map(title_from_name) {
        Some(title) if !title.is_empty() => vec![CardPair::new(title, body.trim())],
        _ => Vec::new(),
    }
}

/// `my_note-file.md` -> `My Note File`
pub fn title_from_name(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    stem.replace(['_', '-'], " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
