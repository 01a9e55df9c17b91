/// typeindex: build, inspect and convert structural indexes of C# source trees
///
/// Commands:
/// - index: scan a directory and write an artifact
/// - inspect: print the summary of any artifact, marked or legacy
/// - convert: re-encode an artifact in another format
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use typeindex::config::{CONFIG_FILE_NAME, OptimizeMode};
use typeindex::indexing::progress::ProgressReporter;
use typeindex::serializer::{self, ArtifactFormat, Compression, SerializeOptions};
use typeindex::{Codebase, IndexedCodebase, Indexer, IndexerConfig, RunOutcome};

#[derive(Parser)]
#[command(name = "typeindex")]
#[command(about = "Token-efficient structural index for C# codebases", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Also write daily-rolling log files to this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a source tree and write the artifact
    Index {
        /// Root directory to scan recursively
        root: PathBuf,

        /// Artifact path; missing parent directories are created
        #[arg(short, long)]
        output: PathBuf,

        /// Config file (defaults to typeindex.toml in the root, if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(short, long, value_enum)]
        format: Option<ArtifactFormat>,

        /// Write the payload without gzip
        #[arg(long)]
        no_compress: bool,

        /// Indent JSON output (uncompressed JSON only)
        #[arg(long)]
        pretty: bool,

        /// Number of parser threads (defaults to CPU count)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Keep documentation exactly as extracted
        #[arg(long)]
        no_optimize: bool,

        /// Also write the string-table form next to the artifact
        #[arg(long)]
        emit_indexed: bool,
    },

    /// Print what an artifact contains
    Inspect {
        artifact: PathBuf,
    },

    /// Re-encode an artifact
    Convert {
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(short, long, value_enum, default_value_t = ArtifactFormat::Json)]
        format: ArtifactFormat,

        #[arg(long)]
        no_compress: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.log_dir.as_deref())?;

    match cli.command {
        Commands::Index {
            root,
            output,
            config,
            format,
            no_compress,
            pretty,
            threads,
            no_optimize,
            emit_indexed,
        } => {
            let mut config = load_config(&root, config.as_deref())?;
            if let Some(format) = format {
                config.format = format;
            }
            if no_compress {
                config.compress = false;
            }
            if pretty {
                config.pretty = true;
            }
            if let Some(threads) = threads {
                config.threads = threads;
            }
            if no_optimize {
                config.optimize = OptimizeMode::None;
            }
            if emit_indexed {
                config.emit_indexed = true;
            }
            index(&root, &output, config)
        }
        Commands::Inspect { artifact } => inspect(&artifact),
        Commands::Convert {
            input,
            output,
            format,
            no_compress,
        } => convert(&input, &output, SerializeOptions::new(format, Compression::from_flag(!no_compress))),
    }
}

/// Console logging to stderr, plus a rolling file when `log_dir` is given
fn init_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("typeindex=info"))
        .map_err(|e| anyhow!("Invalid log filter: {}", e))?;

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let (file_writer, guard) = non_blocking(rolling::daily(dir, "typeindex.log"));
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .with(
                    fmt::layer()
                        .with_writer(file_writer)
                        .with_target(true)
                        .with_ansi(false)
                        .with_file(true)
                        .with_line_number(true),
                )
                .init();
            debug!("File logging enabled in {}", dir.display());
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry().with(filter).with(console).init();
            Ok(None)
        }
    }
}

fn load_config(root: &Path, explicit: Option<&Path>) -> Result<IndexerConfig> {
    match explicit {
        Some(path) => IndexerConfig::load(path),
        None => {
            let candidate = root.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                IndexerConfig::load(&candidate)
            } else {
                Ok(IndexerConfig::default())
            }
        }
    }
}

fn index(root: &Path, output: &Path, config: IndexerConfig) -> Result<()> {
    let reporter = Mutex::new(ProgressReporter::new());
    let mut indexer = Indexer::new(config).with_progress(Arc::new(move |processed, total| {
        if let Ok(mut reporter) = reporter.lock() {
            reporter.report(processed, total);
        }
    }));

    let outcome = indexer
        .run(root, output)
        .with_context(|| format!("Indexing {} failed", root.display()))?;

    match outcome {
        RunOutcome::Completed(report) => {
            for issue in &report.issues {
                eprintln!("⚠️  {}", issue);
            }
            let summary = &report.summary;
            eprintln!(
                "✅ Indexed {}/{} files: {} types ({} classes, {} interfaces, {} structs, {} enums), {} methods, {} properties",
                report.files_indexed,
                report.files_discovered,
                summary.types,
                summary.classes,
                summary.interfaces,
                summary.structs,
                summary.enums,
                summary.methods,
                summary.properties
            );
            eprintln!(
                "📦 {} -> {} bytes ({:.2}x), ~{} -> ~{} tokens, {}ms",
                report.raw_size,
                report.final_size,
                report.compression_ratio(),
                report.tokens_before,
                report.tokens_after,
                report.duration.as_millis()
            );
            eprintln!("💾 Wrote {}", report.output.display());
            if let Some(indexed) = &report.indexed_output {
                eprintln!("💾 Wrote {}", indexed.display());
            }
        }
        RunOutcome::Cancelled { files_parsed } => {
            eprintln!("Indexing cancelled after {} files; nothing written", files_parsed);
        }
    }
    Ok(())
}

fn inspect(artifact: &Path) -> Result<()> {
    let bytes = fs::read(artifact).with_context(|| format!("Failed to read {}", artifact.display()))?;
    let info = serializer::inspect(&bytes).with_context(|| format!("{} is not a readable artifact", artifact.display()))?;
    info!(
        "{} artifact, {:?} compression{}",
        info.format,
        info.compression,
        if info.marked { "" } else { " (legacy, unmarked)" }
    );

    let value: serde_json::Value = serializer::deserialize(&bytes)?;
    let report = if value.get("optimizationLevel").is_some() {
        let indexed: IndexedCodebase = serde_json::from_value(value)?;
        serde_json::json!({
            "format": info.format,
            "compression": info.compression,
            "marked": info.marked,
            "optimizationLevel": indexed.optimization_level,
            "createdAt": indexed.created_at,
            "files": indexed.file_count,
            "strings": indexed.string_table.len(),
        })
    } else {
        let codebase: Codebase = serde_json::from_value(value)?;
        serde_json::json!({
            "format": info.format,
            "compression": info.compression,
            "marked": info.marked,
            "summary": codebase.summary(),
        })
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn convert(input: &Path, output: &Path, options: SerializeOptions) -> Result<()> {
    let bytes = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let converted = serializer::transcode(&bytes, &options)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    fs::write(output, &converted).with_context(|| format!("Failed to write {}", output.display()))?;

    eprintln!(
        "✅ Converted {} ({} bytes) -> {} ({} bytes, {})",
        input.display(),
        bytes.len(),
        output.display(),
        converted.len(),
        options.format
    );
    Ok(())
}
