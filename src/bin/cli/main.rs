mod app;
mod commands;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "note2anki",
    about = "Convert Markdown notes into Anki flashcards via AnkiConnect",
    version
)]
struct Cli {
    /// Note file or vault directory to convert
    input: PathBuf,

    /// Card type: "qa" (one card per `##` heading) or "whole" (one card per note)
    #[arg(long = "type", value_name = "TYPE")]
    card_type: Option<String>,

    /// Target deck (created if missing)
    #[arg(long)]
    deck: Option<String>,

    /// AnkiConnect endpoint
    #[arg(long)]
    url: Option<String>,

    /// Config file (default: <config dir>/note2anki/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Let Anki accept cards that duplicate existing ones
    #[arg(long)]
    allow_duplicates: bool,

    /// Render cards and print them without contacting Anki
    #[arg(long)]
    dry_run: bool,

    /// Output format
    #[arg(long, default_value = "plain")]
    format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    if !cli.input.exists() {
        bail!("Input path {} does not exist", cli.input.display());
    }

    let app = app::App::new(
        cli.config.as_deref(),
        app::Overrides {
            card_type: cli.card_type,
            deck: cli.deck,
            url: cli.url,
            allow_duplicates: cli.allow_duplicates,
        },
    )?;

    if cli.dry_run {
        commands::preview::run(&app, &cli.input, &cli.format)?;
    } else {
        commands::convert::run(&app, &cli.input, &cli.format)?;
    }

    Ok(())
}
