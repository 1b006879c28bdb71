mod display;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use odonto_core::ImageManifest;
use odonto_engine::{ReportPayload, diff, parse_changes, parse_document, reconcile_draft, reconcile_rebuttal};

#[derive(Parser)]
#[command(name = "odonto", version, about = "Finding reconciliation for dental report versions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reconcile a raw generator draft into a canonical payload
    Draft {
        /// Raw draft document (JSON)
        input: PathBuf,
        /// Image manifest (JSON array of {index, id, url?})
        #[arg(long)]
        manifest: Option<PathBuf>,
        /// Render a plain-text card instead of JSON
        #[arg(long)]
        text: bool,
    },
    /// Apply a rebuttal change list to a stored payload
    Rebuttal {
        /// Previous version's payload (JSON)
        base: PathBuf,
        /// Change document (JSON)
        changes: PathBuf,
        #[arg(long)]
        manifest: Option<PathBuf>,
        #[arg(long)]
        text: bool,
    },
    /// Diff two stored payloads
    Diff {
        before: PathBuf,
        after: PathBuf,
        #[arg(long)]
        text: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tracing::info!("odonto v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match cli.command {
        Command::Draft { input, manifest, text } => {
            let doc = read_document(&input)?;
            let images = read_manifest(manifest.as_deref())?;
            let payload = reconcile_draft(&doc, &images);
            emit_payload(&payload, text)
        }
        Command::Rebuttal { base, changes, manifest, text } => {
            let base = read_payload(&base)?;
            let change_doc = read_document(&changes)?;
            let changes = parse_changes(&change_doc)
                .with_context(|| format!("reading change list from {}", changes.display()))?;
            let images = read_manifest(manifest.as_deref())?;
            let payload = reconcile_rebuttal(&base.findings, &changes, &images);
            emit_payload(&payload, text)
        }
        Command::Diff { before, after, text } => {
            let before = read_payload(&before)?;
            let after = read_payload(&after)?;
            let result = diff(&before.findings, &after.findings);
            if text {
                print!("{}", display::render_diff(&result));
            } else {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            Ok(())
        }
    }
}

fn read_document(path: &Path) -> anyhow::Result<serde_json::Value> {
    let body = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let doc = parse_document(&body).with_context(|| format!("parsing {}", path.display()))?;
    Ok(doc)
}

fn read_payload(path: &Path) -> anyhow::Result<ReportPayload> {
    let body = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&body).with_context(|| format!("parsing payload {}", path.display()))
}

fn read_manifest(path: Option<&Path>) -> anyhow::Result<ImageManifest> {
    let Some(path) = path else {
        return Ok(ImageManifest::default());
    };
    let body = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&body).with_context(|| format!("parsing manifest {}", path.display()))
}

fn emit_payload(payload: &ReportPayload, text: bool) -> anyhow::Result<()> {
    if text {
        print!("{}", display::render_report(payload));
    } else {
        println!("{}", serde_json::to_string_pretty(payload)?);
    }
    Ok(())
}
