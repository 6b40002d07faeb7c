#![deny(rust_2018_idioms)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # hl7-cli
//!
//! The `hl7` command: parse, validate and list the types of HL7 v2 files.
//!
//! Exit codes: 0 success, 1 validation failures, 2 unreadable input or
//! timeout, 3 invalid configuration.

mod config;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use config::CliConfig;
use hl7_ir::MessageCollection;
use hl7_pipeline::{BatchConfig, BatchProcessor};
use hl7_schema::{SchemaRegistry, SchemaRegistryBuilder};
use hl7_validation::ValidationReport;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hl7")]
#[command(about = "HL7 v2 parsing and validation")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Decode input with this charset instead of detecting it
    #[arg(long, global = true)]
    encoding: Option<String>,

    /// Worker threads (0 = one per CPU)
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Abandon processing after this many seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a file and print its messages as JSON
    Parse {
        /// Input file path
        input: PathBuf,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Validate every message of a file
    Validate {
        /// Input file path
        input: PathBuf,

        /// Additional schema file (JSON or YAML), may be repeated
        #[arg(short, long)]
        schema: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Fail on warnings as well as errors
        #[arg(long)]
        strict: bool,
    },

    /// List the distinct message types of a file
    Types {
        /// Input file path
        input: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Failures that select a specific exit code
#[derive(Error, Debug)]
enum Failure {
    #[error("{0}")]
    Input(String),

    #[error("Processing timed out after {0}s")]
    Timeout(u64),

    #[error("{0}")]
    Config(String),
}

impl Failure {
    fn exit_code(&self) -> i32 {
        match self {
            Failure::Input(_) | Failure::Timeout(_) => 2,
            Failure::Config(_) => 3,
        }
    }
}

/// Config file values with command-line overrides applied
#[derive(Debug)]
struct Settings {
    config: CliConfig,
    encoding: Option<String>,
    workers: usize,
    timeout: Option<Duration>,
}

impl Settings {
    fn resolve(cli: &Cli) -> Result<Self, Failure> {
        let config = match &cli.config {
            Some(path) => CliConfig::load(path).map_err(|e| Failure::Config(e.to_string()))?,
            None => CliConfig::default(),
        };
        Ok(Self {
            encoding: cli.encoding.clone().or_else(|| config.encoding.clone()),
            workers: cli.workers.or(config.workers).unwrap_or(0),
            timeout: cli.timeout_secs.map(Duration::from_secs),
            config,
        })
    }

    fn batch_config(&self, validate: bool) -> BatchConfig {
        let mut batch = BatchConfig::default().workers(self.workers).validate(validate);
        if let Some(label) = &self.encoding {
            batch = batch.encoding(label.clone());
        }
        batch
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            err.downcast_ref::<Failure>().map_or(2, Failure::exit_code)
        }
    };
    std::io::stdout().flush().ok();
    // A timed-out worker may still be running; leave without joining it.
    std::process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let settings = Settings::resolve(&cli)?;
    init_logging(settings.config.log_level.as_deref())?;
    debug!(?settings, "resolved settings");

    match cli.command {
        Commands::Parse { input, pretty } => {
            let collection = process(&settings, input, builtin_registry()?, false).await?;
            let pretty = pretty || settings.config.pretty;
            let json = if pretty {
                serde_json::to_string_pretty(&collection)?
            } else {
                serde_json::to_string(&collection)?
            };
            println!("{json}");
            let errors = collection.iter().filter(|m| m.has_errors()).count();
            eprintln!("Parse summary: messages={}, errors={errors}", collection.len());
            Ok(0)
        }
        Commands::Validate {
            input,
            schema,
            format,
            strict,
        } => {
            let mut schemas = settings.config.schemas.clone();
            schemas.extend(schema);
            let registry = load_registry(&schemas)?;
            let collection = process(&settings, input, registry, true).await?;
            let report = ValidationReport::from_collection(&collection);

            match format {
                OutputFormat::Text => println!("{report}"),
                OutputFormat::Json => println!("{}", report.to_json(settings.config.pretty)?),
            }

            let strict = strict || settings.config.strict;
            let failed = report.has_errors() || (strict && report.has_warnings());
            info!(
                messages = report.message_count,
                valid = report.valid_count,
                strict,
                "validation finished"
            );
            Ok(i32::from(failed))
        }
        Commands::Types { input } => {
            let collection = process(&settings, input, builtin_registry()?, false).await?;
            for message_type in collection.message_types() {
                println!("{message_type}");
            }
            Ok(0)
        }
    }
}

fn init_logging(level: Option<&str>) -> Result<(), Failure> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level.unwrap_or("warn"))
            .map_err(|e| Failure::Config(format!("Invalid log_level: {e}")))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn builtin_registry() -> anyhow::Result<Arc<SchemaRegistry>> {
    let registry = SchemaRegistry::builtin().context("Failed to build builtin schema")?;
    Ok(Arc::new(registry))
}

fn load_registry(schemas: &[PathBuf]) -> Result<Arc<SchemaRegistry>, Failure> {
    let mut builder = SchemaRegistryBuilder::builtin();
    for path in schemas {
        debug!(path = %path.display(), "loading schema");
        builder = builder.load_file(path).map_err(|e| {
            Failure::Config(format!("Failed to load schema '{}': {e}", path.display()))
        })?;
    }
    let registry = builder
        .build()
        .map_err(|e| Failure::Config(format!("Failed to load schema: {e}")))?;
    Ok(Arc::new(registry))
}

/// Read, parse and optionally validate a file off the async runtime
async fn process(
    settings: &Settings,
    input: PathBuf,
    registry: Arc<SchemaRegistry>,
    validate: bool,
) -> anyhow::Result<MessageCollection> {
    let processor = BatchProcessor::new(settings.batch_config(validate), registry)?;
    let handle = tokio::task::spawn_blocking(move || processor.process_file(&input));

    let joined = match settings.timeout {
        Some(limit) => tokio::time::timeout(limit, handle)
            .await
            .map_err(|_| Failure::Timeout(limit.as_secs()))?,
        None => handle.await,
    };
    let collection = joined
        .context("worker task failed")?
        .map_err(|e| Failure::Input(e.to_string()))?;
    Ok(collection)
}
