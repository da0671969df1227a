use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use smref_core::Field;
use smref_core::config_file::{self, ConfigFile};
use smref_ingest::{ExtractedDocument, ScanOptions};
use smref_reporting::ExportFormat;
use tracing_subscriber::EnvFilter;

mod output;

use output::{AnsiStyle, ColorMode};

/// SuperMemo reference extractor - Pull #Author/#Title/... metadata out of HTML exports
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract reference metadata from HTML files, directories, or stdin
    Extract {
        /// Files or directories to read; `-` reads from stdin
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output format: text, json, csv, markdown
        #[arg(short, long)]
        format: Option<String>,

        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Print only this field's value, one line per document
        #[arg(long, conflicts_with = "format")]
        field: Option<Field>,

        /// Leave out documents without any reference data
        #[arg(long)]
        skip_empty: bool,

        /// Do not descend into subdirectories
        #[arg(long)]
        no_recursive: bool,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the platform config file path
    Path,
    /// Print the effective configuration
    Show,
    /// Write a config file with default values
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Extract {
            paths,
            format,
            output,
            no_color,
            field,
            skip_empty,
            no_recursive,
        } => extract(
            paths,
            format,
            output,
            no_color,
            field,
            skip_empty,
            no_recursive,
        ),
        Command::Config { action } => config(action),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[allow(clippy::too_many_arguments)]
fn extract(
    paths: Vec<PathBuf>,
    format: Option<String>,
    output: Option<PathBuf>,
    no_color: bool,
    field: Option<Field>,
    skip_empty: bool,
    no_recursive: bool,
) -> anyhow::Result<()> {
    let cfg = config_file::load_config();

    // Resolve configuration: CLI flags > env vars > config file > defaults
    let format: ExportFormat = match format
        .or_else(|| std::env::var("SMREF_FORMAT").ok())
        .or_else(|| cfg.format().map(str::to_string))
    {
        Some(name) => name.parse()?,
        None => ExportFormat::default(),
    };
    let skip_empty = skip_empty || cfg.skip_empty();
    let options = ScanOptions {
        extensions: cfg.extensions(),
        recursive: !no_recursive && cfg.recursive(),
    };

    let use_color = !no_color
        && output.is_none()
        && cfg.color()
        && std::env::var_os("NO_COLOR").is_none();
    let color = ColorMode(use_color);

    let read_stdin = paths.iter().any(|p| p.as_os_str() == "-");
    let file_paths: Vec<PathBuf> = paths.into_iter().filter(|p| p.as_os_str() != "-").collect();

    let mut documents: Vec<ExtractedDocument> = Vec::new();
    if read_stdin {
        let stdin = std::io::stdin();
        documents.push(smref_ingest::extract_reader(stdin.lock(), "<stdin>")?);
    }
    let batch = smref_ingest::extract_all(&file_paths, &options);
    documents.extend(batch.documents);

    if skip_empty {
        documents.retain(|d| d.record.as_ref().is_some_and(|r| !r.is_empty()));
    }

    let mut stderr = std::io::stderr();
    for (path, err) in &batch.failures {
        output::print_failure(&mut stderr, path, err, color)?;
    }

    match (&output, field) {
        (Some(path), None) => {
            smref_reporting::export_to_path(&documents, format, path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), %format, "export written");
        }
        (Some(path), Some(field)) => {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_field_values(&mut file, &documents, field)?;
        }
        (None, Some(field)) => {
            write_field_values(&mut std::io::stdout().lock(), &documents, field)?;
        }
        (None, None) => {
            let stdout = std::io::stdout();
            let mut w = stdout.lock();
            let rendered = if format == ExportFormat::Text && color.enabled() {
                smref_reporting::render_text(&documents, &AnsiStyle)
            } else {
                smref_reporting::render(&documents, format)?
            };
            w.write_all(rendered.as_bytes())?;
            w.flush()?;
        }
    }

    if !batch.failures.is_empty() {
        anyhow::bail!("{} input(s) could not be read", batch.failures.len());
    }
    Ok(())
}

fn write_field_values(
    w: &mut dyn Write,
    documents: &[ExtractedDocument],
    field: Field,
) -> anyhow::Result<()> {
    for doc in documents {
        output::print_field(w, doc.record.as_ref(), field)?;
    }
    Ok(())
}

fn config(action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Path => {
            let path = config_file::config_path()
                .context("could not determine config directory")?;
            println!("{}", path.display());
        }
        ConfigAction::Show => {
            let effective = config_file::merge(ConfigFile::with_defaults(), config_file::load_config());
            print!("{}", toml::to_string_pretty(&effective)?);
        }
        ConfigAction::Init { force } => {
            let path = config_file::config_path()
                .context("could not determine config directory")?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            let path = config_file::save_config(&ConfigFile::with_defaults())?;
            println!("Wrote default config to {}", path.display());
        }
    }
    Ok(())
}
