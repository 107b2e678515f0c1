//! lockstep: re-project source document changes onto a translation.
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use lockstep::config::Config;
use lockstep::decompose::{decompose, decompose_with};
use lockstep::formats::markdown::MarkdownFormat;
use lockstep::front_matter::Document;
use lockstep::heading_map::{is_congruent, prune, update, HeadingMap};
use lockstep::plan::PatchPlan;
use lockstep::section::outline;
use lockstep::sync::{SyncRequest, Synchronizer};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lockstep")]
#[command(about = "Keep translated markdown in step with its source", long_about = None)]
struct Args {
    /// Configuration file (defaults to ./lockstep.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the JSON patch plan for a source revision change
    Plan {
        /// Previous revision of the source document
        #[arg(long)]
        old: PathBuf,
        /// Current revision of the source document
        #[arg(long)]
        new: PathBuf,
        /// Translated document to update
        #[arg(long)]
        target: PathBuf,
        /// Source language code
        #[arg(long, default_value = "en")]
        source_lang: String,
        /// Target language code
        #[arg(long, default_value = "")]
        target_lang: String,
    },
    /// Apply a patch plan whose replacements have been filled in
    Apply {
        /// Translated document the plan was made against
        #[arg(long)]
        target: PathBuf,
        /// Patch plan JSON
        #[arg(long)]
        plan: PathBuf,
        /// Overwrite the target instead of printing the result
        #[arg(long)]
        write: bool,
    },
    /// Rebuild the heading map of a translation from its source
    Headings {
        /// Current source document
        #[arg(long)]
        source: PathBuf,
        /// Translated document holding the heading map
        #[arg(long)]
        target: PathBuf,
        /// Overwrite the target instead of printing the result
        #[arg(long)]
        write: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("LOCKSTEP_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> lockstep::Result<()> {
    let cfg = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };

    match args.command {
        Command::Plan {
            old,
            new,
            target,
            source_lang,
            target_lang,
        } => {
            let old_source = fs::read_to_string(&old)?;
            let new_source = fs::read_to_string(&new)?;
            let target_text = fs::read_to_string(&target)?;
            let file_path = target.to_string_lossy();
            let request = SyncRequest {
                old_source: &old_source,
                new_source: &new_source,
                target: &target_text,
                file_path: &file_path,
                source_lang: &source_lang,
                target_lang: &target_lang,
                glossary: None,
            };
            let (plan, changes) = Synchronizer::new(cfg).plan(&request)?;
            tracing::info!(changes = changes.len(), edits = plan.edits.len(), "planned");
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Apply {
            target,
            plan,
            write,
        } => {
            let plan: PatchPlan = serde_json::from_str(&fs::read_to_string(&plan)?)?;
            let mut document = Document::split(&fs::read_to_string(&target)?);
            let units = decompose_with(&document.body, &MarkdownFormat, cfg.granularity()?)?;
            document.body = plan.apply(&units)?;
            emit(&target, &document.render(), write)?;
        }
        Command::Headings {
            source,
            target,
            write,
        } => {
            let source_doc = Document::split(&fs::read_to_string(&source)?);
            let mut document = Document::split(&fs::read_to_string(&target)?);
            let table = HeadingMap::load(&document, &cfg.heading_map_key)?;
            let source_outline = outline(&decompose(&source_doc.body, &MarkdownFormat)?);
            let target_outline = outline(&decompose(&document.body, &MarkdownFormat)?);
            let rebuilt = if is_congruent(&source_outline, &target_outline) {
                update(&table, &source_outline, &target_outline, None)
            } else {
                eprintln!("Outlines differ in shape; only pruning stale headings");
                prune(&table, &source_outline, None)
            };
            rebuilt.store(&mut document, &cfg.heading_map_key)?;
            emit(&target, &document.render(), write)?;
        }
    }
    Ok(())
}

fn emit(target: &Path, text: &str, write: bool) -> lockstep::Result<()> {
    if write {
        fs::write(target, text)?;
    } else {
        print!("{text}");
    }
    Ok(())
}
