//! Question/answer extraction
//!
//! ```text
//! # Biology            <- discarded
//! ## What is a cell?   <- front
//! The basic unit       <- back
//! of life.
//! ## Empty question    <- no answer, dropped
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use super::{join_trimmed, CardPair};
use crate::markdown::fences::FenceTracker;
use crate::markdown::split_frontmatter;

/// Exactly two `#`, whitespace, then the question
static QUESTION_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^##[ \t]+(.*\S)").expect("valid question heading pattern"));

struct Section<'a> {
    question: String,
    lines: Vec<&'a str>,
}

/// Split a note into one card per second-level section.
///
/// Sections whose answer is empty produce no card.
pub fn extract(text: &str, _name: Option<&str>) -> Vec<CardPair> {
    let (_, body) = split_frontmatter(text);

    let mut cards = Vec::new();
    let mut fences = FenceTracker::new();
    let mut current: Option<Section> = None;

    for line in body.lines() {
        let in_code = fences.observe(line);

        if !in_code {
            if let Some(question) = question_heading(line) {
                push_card(current.take(), &mut cards);
                current = Some(Section {
                    question,
                    lines: Vec::new(),
                });
                continue;
            }
        }

        if let Some(section) = current.as_mut() {
            section.lines.push(line);
        }
    }
    push_card(current, &mut cards);

    cards
}

fn question_heading(line: &str) -> Option<String> {
    QUESTION_HEADING
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

fn push_card(section: Option<Section>, cards: &mut Vec<CardPair>) {
    let Some(section) = section else {
        return;
    };

    let answer = join_trimmed(&section.lines);
    if !answer.is_empty() {
        cards.push(CardPair::new(section.question, answer));
    }
}
