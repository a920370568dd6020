//! YAML front-matter
//!
//! Obsidian notes may start with a metadata block:
//!
//! ```text
//! ---
//! tags: [biology, cells]
//! ---
//! # Note title
//! ```
//!
//! Only the `tags` key is consumed. Splitting is purely lexical so extraction
//! strategies can drop the block without caring whether the YAML is valid;
//! [`Frontmatter::from_yaml`] does the strict parse.

use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("front-matter is not a key/value mapping")]
    NotAMapping,
}

/// Parsed front-matter values keyed by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    values: BTreeMap<String, serde_yaml::Value>,
}

/// Split a leading `---` block off a note.
///
/// Returns the raw YAML (without delimiters) and the body that follows the
/// closing `---` (or `...`) line. Text without an opening delimiter on its
/// first line, or without a closing delimiter, has no front-matter.
pub fn split_frontmatter(text: &str) -> (Option<&str>, &str) {
    let content = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut lines = content.split_inclusive('\n');
    let first = match lines.next() {
        Some(line) => line,
        None => return (None, content),
    };
    if first.trim_end() != "---" {
        return (None, content);
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        let delimiter = line.trim_end();
        if delimiter == "---" || delimiter == "..." {
            let yaml = &content[yaml_start..offset];
            let body = &content[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }

    (None, content)
}

impl Frontmatter {
    /// Parse the front-matter of a whole note. Notes without a block get an
    /// empty `Frontmatter`.
    pub fn parse(text: &str) -> Result<Self, FrontmatterError> {
        match split_frontmatter(text) {
            (Some(yaml), _) => Self::from_yaml(yaml),
            (None, _) => Ok(Self::default()),
        }
    }

    /// Parse the YAML between the delimiters
    pub fn from_yaml(yaml: &str) -> Result<Self, FrontmatterError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let mapping = match serde_yaml::from_str::<serde_yaml::Value>(yaml)? {
            serde_yaml::Value::Mapping(mapping) => mapping,
            serde_yaml::Value::Null => return Ok(Self::default()),
            _ => return Err(FrontmatterError::NotAMapping),
        };

        let values = mapping
            .into_iter()
            .filter_map(|(key, value)| match key {
                serde_yaml::Value::String(key) => Some((key, value)),
                _ => None,
            })
            .collect();

        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Tags from the `tags` key, either a YAML list or a comma-separated
    /// string. Tags are normalized for Anki, which splits tags on whitespace.
    pub fn tags(&self) -> Vec<String> {
        let mut raw: Vec<String> = Vec::new();

        match self.values.get("tags") {
            Some(serde_yaml::Value::Sequence(seq)) => {
                for item in seq {
                    match item {
                        serde_yaml::Value::String(s) => raw.push(s.clone()),
                        serde_yaml::Value::Number(n) => raw.push(n.to_string()),
                        serde_yaml::Value::Bool(b) => raw.push(b.to_string()),
                        _ => {}
                    }
                }
            }
            Some(serde_yaml::Value::String(s)) => {
                raw.extend(s.split(',').map(str::to_string));
            }
            _ => {}
        }

        let mut tags: Vec<String> = Vec::new();
        for tag in raw {
            let tag = normalize_tag(&tag);
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }
}

/// Trim, drop an Obsidian-style leading `#`, and join inner whitespace with `_`
fn normalize_tag(tag: &str) -> String {
    let tag = tag.trim();
    let tag = tag.strip_prefix('#').unwrap_or(tag);
    tag.split_whitespace().collect::<Vec<_>>().join("_")
}
