//! Card extraction
//!
//! Two strategies turn a note into (front, back) pairs:
//! - `qa`: every `## Question` heading starts a card, its section is the answer
//! - `whole`: the note title is the front, the rest of the note the back

pub mod models;
pub mod qa;
pub mod whole;

pub use models::*;

/// Join lines with their original breaks, dropping blank lines at both ends
pub(crate) fn join_trimmed(lines: &[&str]) -> String {
    let is_blank = |line: &&str| line.trim().is_empty();
    let start = lines.iter().position(|line| !is_blank(line));
    let end = lines.iter().rposition(|line| !is_blank(line));

    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}
