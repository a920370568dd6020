use std::path::Path;

use anyhow::{Context, Result};

use note2anki_lib::obsidian::{collect_path, NoteOutcome};

use crate::app::App;
use crate::OutputFormat;

/// Render every card without talking to Anki
pub fn run(app: &App, input: &Path, format: &OutputFormat) -> Result<()> {
    let collection = collect_path(input, &app.options)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&collection)?);
        }
        OutputFormat::Plain => {
            for note in &collection.notes {
                println!("== {} [{}]", note.path.display(), note.tags.join(", "));

                if note.cards.is_empty() {
                    println!("(no cards)");
                }
                for (index, card) in note.cards.iter().enumerate() {
                    println!("--- card {} front", index + 1);
                    println!("{}", card.front);
                    println!("--- card {} back", index + 1);
                    println!("{}", card.back);
                }
                println!();
            }

            for failure in &collection.failures {
                if let NoteOutcome::Failed { path, reason } = failure {
                    println!("{}: skipped ({})", path.display(), reason);
                }
            }

            println!(
                "{} card(s) from {} note(s) would be added to deck '{}'",
                collection.card_count(),
                collection.notes.len(),
                app.options.deck
            );
        }
    }

    Ok(())
}
