use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use draftlens::backend::ExecResponse;
use draftlens::render::{self, RenderOptions};
use draftlens::session::Session;

/// Show the structural preview of a SQL draft without running it.
#[derive(Debug, Parser)]
#[command(name = "draftlens", version)]
struct Cli {
    /// Draft file, or `-` to read stdin
    draft: String,

    /// Question to build a checklist for
    #[arg(short, long)]
    question: Option<String>,

    /// Execution response (JSON) holding the table's existing rows
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Text shown for cells the draft has not filled yet
    #[arg(long)]
    placeholder: Option<String>,

    /// Clip cells wider than this many columns
    #[arg(long)]
    max_cell_width: Option<usize>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let draft = if cli.draft == "-" {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read draft from stdin")?;
        input
    } else {
        fs::read_to_string(&cli.draft).with_context(|| format!("Failed to read {}", cli.draft))?
    };

    let mut options = RenderOptions::default();
    if let Some(placeholder) = cli.placeholder {
        options.placeholder = placeholder;
    }
    if let Some(width) = cli.max_cell_width {
        options.max_cell_width = width;
    }

    let mut session = Session::new();
    session.set_draft(draft);

    if let Some(path) = &cli.snapshot {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        match session.snapshot_request() {
            Some(ticket) => {
                session.deliver_snapshot(&ticket, ExecResponse::from_json(&json));
            }
            None => tracing::warn!("no previewed table, ignoring snapshot"),
        }
    }

    print!("{}", render::preview_table(session.preview(), &options));

    if let Some(question) = cli.question {
        session.ask(question);
        println!();
        print!("{}", render::checklist(session.roadmap(), &session.progress()));
    }

    Ok(())
}
