use std::path::Path;

use anyhow::{Context, Result};

use note2anki_lib::obsidian::{ConvertReport, Converter, NoteOutcome};

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, input: &Path, format: &OutputFormat) -> Result<()> {
    let client = app.client()?;

    let version = client.version().with_context(|| {
        format!(
            "Could not reach AnkiConnect at {}. Please start Anki and make sure AnkiConnect is installed",
            client.url()
        )
    })?;
    log::info!("Connected to AnkiConnect v{} at {}", version, client.url());

    let deck = &app.options.deck;
    client
        .ensure_deck_exists(deck)
        .with_context(|| format!("Failed to prepare deck '{}'", deck))?;

    let converter = Converter::new(&client, app.options.clone());
    let report = converter
        .convert_path(input)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "deck": deck,
                "cardType": app.options.strategy.as_str(),
                "cardsAdded": report.cards_added(),
                "cardsRejected": report.cards_rejected(),
                "notesFailed": report.failed_notes().count(),
                "notes": report.outcomes,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => print_plain(&report, deck),
    }

    Ok(())
}

fn print_plain(report: &ConvertReport, deck: &str) {
    for outcome in &report.outcomes {
        match outcome {
            NoteOutcome::Converted { path, added, rejected } => {
                println!("{}: {} card(s) added", path.display(), added);
                for rejection in rejected {
                    println!("  card {} rejected: {}", rejection.index + 1, rejection.reason);
                }
            }
            NoteOutcome::Failed { path, reason } => {
                println!("{}: skipped ({})", path.display(), reason);
            }
        }
    }

    println!();
    println!("Added {} card(s) to deck '{}'", report.cards_added(), deck);

    let rejected = report.cards_rejected();
    if rejected > 0 {
        println!("{} card(s) rejected by Anki", rejected);
    }

    let failed = report.failed_notes().count();
    if failed > 0 {
        println!("{} note(s) skipped", failed);
    }
}
