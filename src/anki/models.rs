//! AnkiConnect wire types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Envelope for every AnkiConnect call
#[derive(Debug, Clone, Serialize)]
pub struct AnkiRequest<'a, P> {
    pub action: &'a str,
    pub version: u8,
    pub params: P,
}

/// Envelope of every AnkiConnect reply. Exactly one of the two is set on a
/// well-behaved server.
#[derive(Debug, Clone, Deserialize)]
pub struct AnkiResponse<T> {
    pub result: Option<T>,
    pub error: Option<String>,
}

/// A note submitted with `addNote`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnkiNote {
    pub deck_name: String,
    pub model_name: String,
    pub fields: BTreeMap<String, String>,
    pub options: NoteOptions,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteOptions {
    pub allow_duplicate: bool,
}

/// `addNote` parameters
#[derive(Debug, Serialize)]
pub struct AddNoteParams<'a> {
    pub note: &'a AnkiNote,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_serializes_camel_case() {
        let note = AnkiNote {
            deck_name: "Obsidian Notes".to_string(),
            model_name: "Basic".to_string(),
            fields: BTreeMap::from([
                ("Front".to_string(), "<p>Q</p>".to_string()),
                ("Back".to_string(), "<p>A</p>".to_string()),
            ]),
            options: NoteOptions { allow_duplicate: false },
            tags: vec!["obsidian".to_string()],
        };

        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "deckName": "Obsidian Notes",
                "modelName": "Basic",
                "fields": { "Back": "<p>A</p>", "Front": "<p>Q</p>" },
                "options": { "allowDuplicate": false },
                "tags": ["obsidian"]
            })
        );
    }

    #[test]
    fn test_response_with_error() {
        let response: AnkiResponse<i64> =
            serde_json::from_str(r#"{"result": null, "error": "cannot create note because it is a duplicate"}"#)
                .unwrap();
        assert!(response.result.is_none());
        assert_eq!(response.error.as_deref(), Some("cannot create note because it is a duplicate"));
    }

    #[test]
    fn test_response_with_result() {
        let response: AnkiResponse<Vec<String>> =
            serde_json::from_str(r#"{"result": ["Default"], "error": null}"#).unwrap();
        assert_eq!(response.result, Some(vec!["Default".to_string()]));
        assert!(response.error.is_none());
    }
}
