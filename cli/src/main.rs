use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use doc_model::StructuredDocument;
use pipeline::{Pipeline, PipelineOutput, SettingsLoader};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// docpatch - Apply provider change proposals to an extracted document
#[derive(Parser, Debug)]
#[command(name = "docpatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Extracted document (.json from the extractor, anything else as plain text)
    #[arg(short, long)]
    document: PathBuf,

    /// Provider response holding the proposed changes
    #[arg(short, long)]
    proposals: PathBuf,

    /// Pipeline settings file (JSON)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// What to print
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Full pipeline output
    Json,
    /// Diff as an HTML fragment
    Html,
    /// Patched document as plain text
    Text,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let output = run(&cli)?;
    println!("{}", render(&output, cli.format)?);
    Ok(())
}

fn run(cli: &Cli) -> Result<PipelineOutput> {
    let settings = match &cli.settings {
        Some(path) => SettingsLoader::new(path)
            .load_sync()
            .with_context(|| format!("Failed to read settings {}", path.display()))?
            .clone(),
        None => Default::default(),
    };

    let document = load_document(&cli.document)?;
    let response = std::fs::read_to_string(&cli.proposals)
        .with_context(|| format!("Failed to read proposals {}", cli.proposals.display()))?;

    tracing::info!(
        "Patching {} paragraph(s) from {}",
        document.len(),
        cli.document.display()
    );
    Ok(Pipeline::new(settings).run_response(document, &response))
}

fn load_document(path: &Path) -> Result<StructuredDocument> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read document {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        StructuredDocument::from_extraction_json(&content)
            .with_context(|| format!("Invalid extraction payload in {}", path.display()))
    } else {
        Ok(StructuredDocument::from_plain_text(&content))
    }
}

fn render(output: &PipelineOutput, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(output)?,
        OutputFormat::Html => output.diff_html(),
        OutputFormat::Text => output.optimized_text.clone(),
    })
}
