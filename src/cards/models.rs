//! Data models for card extraction

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{qa, whole};
use crate::config::ConfigError;

/// A card before rendering: plain Markdown front and back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPair {
    pub front: String,
    pub back: String,
}

impl CardPair {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
        }
    }
}

/// A card after rendering: HTML front and back, math in MathJax delimiters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedCard {
    pub front: String,
    pub back: String,
}

/// How a note is split into cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// One card per `##` section
    Qa,
    /// One card for the whole note
    Whole,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::Qa, Strategy::Whole];

    /// Extract cards from raw note text. `name` is the note's file name and is
    /// only used as a title fallback.
    pub fn extract(&self, text: &str, name: Option<&str>) -> Vec<CardPair> {
        match self {
            Strategy::Qa => qa::extract(text, name),
            Strategy::Whole => whole::extract(text, name),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Qa => "qa",
            Strategy::Whole => "whole",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == wanted)
            .ok_or_else(|| ConfigError::UnknownStrategy(s.to_string()))
    }
}
