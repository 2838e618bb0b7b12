use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use rust_upload_organizer::config::OrganizerConfig;
use rust_upload_organizer::utils::manifest_json::{read_manifest, render};
use rust_upload_organizer::{FileRecord, organize};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Reorganize an upload manifest (JSON) into one record per file.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Manifest file to read. Reads stdin when omitted or "-".
    input: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Deepest attribute tree accepted per field
    #[arg(long, value_name = "LEVELS")]
    max_nesting: Option<usize>,

    /// Print one line per file instead of JSON
    #[arg(long)]
    summary: bool,
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = Cli::parse();
    let mut config = OrganizerConfig::from_env();
    if cli.pretty {
        config.pretty_output = true;
    }
    if let Some(levels) = cli.max_nesting {
        config.max_nesting_level = levels;
    }

    // Logs go to stderr so stdout stays machine readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let manifest = match cli.input.as_deref() {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open manifest {}", path.display()))?;
            read_manifest(BufReader::new(file), &config)
                .with_context(|| format!("Failed to read manifest {}", path.display()))?
        }
        _ => read_manifest(io::stdin().lock(), &config).context("Failed to read manifest from stdin")?,
    };

    let files = organize(&manifest);
    info!(
        "📦 Organized {} file(s) across {} field(s)",
        files.file_count(),
        files.len()
    );

    let mut stdout = io::stdout().lock();
    if cli.summary {
        for (path, record) in files.files() {
            writeln!(stdout, "{}", summary_line(&path.to_string(), record))?;
        }
    } else {
        writeln!(stdout, "{}", render(&files, config.pretty_output)?)?;
    }

    Ok(())
}

fn summary_line(path: &str, record: &FileRecord) -> String {
    let name = record.client_name().unwrap_or("-");
    let mime_type = record
        .mime_type
        .as_ref()
        .map(|t| t.to_string())
        .unwrap_or_else(|| "-".to_string());
    let size = record
        .size_bytes()
        .map(|s| format!("{} bytes", s))
        .unwrap_or_else(|| "-".to_string());
    let status = record
        .error_code()
        .map(|code| code.description())
        .unwrap_or("unknown status");

    format!("{}\t{}\t{}\t{}\t{}", path, name, mime_type, size, status)
}
