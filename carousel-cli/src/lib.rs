//! # Carousel CLI
//!
//! Command-line front end over `carousel-core`.
//!
//! ## Usage
//!
//! ```bash
//! carousel inspect post.json
//! carousel migrate old.json -o post.json
//! carousel export post.json --format markdown
//! carousel new "Cinco dicas" --template cover --data-dir ./carousels
//! carousel apply post.json edits.json -o edited.json --strict
//! ```
//!
//! Every command writes its result to stdout (or `--output`); logs go to
//! stderr.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use carousel_core::{
    export, migrate, Action, CarouselDocument, DocumentStore, EditorConfig, EditorState,
    FileStore, IdAllocator, MigrationReport, SlideTemplate,
};
use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `carousel`.
#[derive(Debug, Clone, Parser)]
#[command(name = "carousel")]
#[command(about = "Inspect, migrate, export and edit carousel documents")]
#[command(version)]
pub struct CliArgs {
    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print a summary of a document
    Inspect {
        /// Document JSON file
        file: PathBuf,
    },
    /// Bring a document up to the current schema
    Migrate {
        /// Document JSON file
        file: PathBuf,
        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Fail unless the top-level shape is valid
        #[arg(long)]
        strict: bool,
    },
    /// Export a document as Markdown or JSON
    Export {
        /// Document JSON file
        file: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = ExportFormat::Markdown)]
        format: ExportFormat,
        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Create a document and store it in the data directory
    New {
        /// Document title
        title: String,
        /// First slide template (blank, cover, title-body, icon-list, quote,
        /// highlight, cta, image-text, freeform)
        #[arg(long, default_value = "cover", value_parser = parse_template)]
        template: SlideTemplate,
        /// Data directory
        #[arg(long, env = "CAROUSEL_DATA_DIR")]
        data_dir: PathBuf,
    },
    /// List the documents in the data directory
    List {
        /// Data directory
        #[arg(long, env = "CAROUSEL_DATA_DIR")]
        data_dir: PathBuf,
    },
    /// Replay a JSON array of editor actions against a document
    Apply {
        /// Document JSON file
        file: PathBuf,
        /// Actions JSON file
        actions: PathBuf,
        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Undo depth kept while replaying
        #[arg(long, env = "CAROUSEL_HISTORY_LIMIT", default_value_t = 50)]
        history_limit: usize,
        /// Fail on the first action that cannot apply
        #[arg(long)]
        strict: bool,
    },
}

/// Export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Readable Markdown outline.
    Markdown,
    /// Pretty JSON document.
    Json,
}

fn parse_template(key: &str) -> Result<SlideTemplate, String> {
    SlideTemplate::parse(key).ok_or_else(|| {
        let known: Vec<&str> = SlideTemplate::ALL.iter().map(|t| t.key()).collect();
        format!("unknown template {key:?} (expected one of: {})", known.join(", "))
    })
}

/// Run one command, writing its result to `out` unless an output file is given.
///
/// # Errors
///
/// Returns an error if an input cannot be read or parsed, or an output
/// cannot be written.
pub async fn run(args: CliArgs, out: &mut impl Write) -> Result<()> {
    match args.command {
        Command::Inspect { file } => {
            let (doc, report) = load_document(&file, false)?;
            write_summary(&doc, &report, out)
        }
        Command::Migrate {
            file,
            output,
            strict,
        } => {
            let (doc, report) = load_document(&file, strict)?;
            if !report.is_clean() {
                tracing::info!(
                    dropped_elements = report.dropped_elements,
                    regenerated_ids = report.regenerated_ids,
                    sanitized_fields = report.sanitized_fields,
                    defaulted_layouts = report.defaulted_layouts,
                    "Document repaired"
                );
            }
            write_output(output.as_deref(), &export::to_json(&doc)?, out)
        }
        Command::Export {
            file,
            format,
            output,
        } => {
            let (doc, _) = load_document(&file, false)?;
            let contents = match format {
                ExportFormat::Markdown => export::to_markdown(&doc),
                ExportFormat::Json => export::to_json(&doc)?,
            };
            write_output(output.as_deref(), &contents, out)
        }
        Command::New {
            title,
            template,
            data_dir,
        } => create_document(&title, template, &data_dir, out).await,
        Command::List { data_dir } => {
            let store = FileStore::new(data_dir);
            for id in store.list().await? {
                writeln!(out, "{id}")?;
            }
            Ok(())
        }
        Command::Apply {
            file,
            actions,
            output,
            history_limit,
            strict,
        } => {
            let (doc, _) = load_document(&file, false)?;
            let actions = read_actions(&actions)?;
            let state = apply_actions(doc, actions, history_limit, strict)?;
            write_output(output.as_deref(), &export::to_json(state.document())?, out)
        }
    }
}

/// Read a document file and migrate it.
fn load_document(path: &Path, strict: bool) -> Result<(CarouselDocument, MigrationReport)> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    if strict {
        let problems = migrate::validate_shape(&value);
        if !problems.is_empty() {
            bail!(
                "{} is not a carousel document: {}",
                path.display(),
                problems.join("; ")
            );
        }
    }
    migrate::migrate_with_report(value)
        .with_context(|| format!("failed to migrate {}", path.display()))
}

fn read_actions(path: &Path) -> Result<Vec<Action>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON array of actions", path.display()))
}

fn apply_actions(
    doc: CarouselDocument,
    actions: Vec<Action>,
    history_limit: usize,
    strict: bool,
) -> Result<EditorState> {
    let config = EditorConfig::default().with_history_limit(history_limit);
    let mut state = EditorState::with_config(doc, config);
    let count = actions.len();
    let mut rejected = 0;
    for (index, action) in actions.into_iter().enumerate() {
        let name = action.name();
        if let Err(err) = state.try_dispatch(action) {
            if strict {
                return Err(err).with_context(|| format!("action #{index} ({name}) failed"));
            }
            tracing::warn!(index, action = name, error = %err, "Action skipped");
            rejected += 1;
        }
    }
    tracing::info!(
        actions = count,
        rejected,
        revision = state.revision(),
        undo_depth = state.history().undo_len(),
        "Actions applied"
    );
    Ok(state)
}

async fn create_document(
    title: &str,
    template: SlideTemplate,
    data_dir: &Path,
    out: &mut impl Write,
) -> Result<()> {
    let store = FileStore::new(data_dir);
    let existing = store.list().await?;
    let id = unique_id(&export::slugify(title), &existing);

    let mut doc = CarouselDocument::new_empty(id.as_str()).with_title(title);
    let mut ids = IdAllocator::for_document(&doc);
    doc.slides.push(template.instantiate(&mut ids));
    store.save(&id, &doc).await?;

    tracing::info!(document_id = %id, template = template.key(), "Document created");
    writeln!(out, "{}", store.path_for(&id).display())?;
    Ok(())
}

/// `base`, or `base-2`, `base-3`, ... whichever is not taken.
fn unique_id(base: &str, existing: &[String]) -> String {
    let taken = |candidate: &str| existing.iter().any(|id| id == candidate);
    if !taken(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

fn write_summary(doc: &CarouselDocument, report: &MigrationReport, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{} ({})", doc.title, doc.id)?;
    writeln!(
        out,
        "{} slides, {} elements, theme {}, canvas {}x{}",
        doc.slides.len(),
        doc.element_count(),
        doc.theme.name,
        doc.canvas.width,
        doc.canvas.height
    )?;
    for (index, slide) in doc.slides.iter().enumerate() {
        writeln!(
            out,
            "{:>3}. {:<14} {} elements",
            index + 1,
            slide.layout().label(),
            slide.len()
        )?;
    }
    if !report.is_clean() {
        writeln!(
            out,
            "repaired: {} dropped elements, {} new ids, {} sanitized fields, {} defaulted layouts",
            report.dropped_elements,
            report.regenerated_ids,
            report.sanitized_fields,
            report.defaulted_layouts
        )?;
    }
    Ok(())
}

fn write_output(output: Option<&Path>, contents: &str, out: &mut impl Write) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, contents)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = contents.len(), "Output written");
        }
        None => {
            out.write_all(contents.as_bytes())?;
            if !contents.ends_with('\n') {
                writeln!(out)?;
            }
        }
    }
    Ok(())
}
