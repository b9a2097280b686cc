//! SchemaDB command line
//!
//! ## Usage
//!
//! ```bash
//! # Register a schema from a request body ({"avroSchema": {...}, "keyColumn": "id"})
//! schemadb --storage-path ./schemas create-schema users --file users.json
//!
//! # Show a stored schema
//! schemadb --storage-path ./schemas describe users
//!
//! # Upsert and fetch records (records live as long as the shell)
//! schemadb --storage-path ./schemas shell
//! > upsert users {"id": 1, "name": "Ann"}
//! > get users 1
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use schemadb::{CreateSchemaRequest, DbConfig, DbError, SchemaDb};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schemadb")]
#[command(author, version, about = "SchemaDB - schema-governed record store")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Schema storage directory (overrides the config file)
    #[arg(long, global = true)]
    storage_path: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or replace a schema
    CreateSchema {
        /// Schema name
        name: String,

        /// Request body file ({"avroSchema": ..., "keyColumn": ...})
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show a stored schema
    Describe {
        /// Schema name
        name: String,

        /// Print the Avro schema JSON instead of the field summary
        #[arg(long)]
        json: bool,
    },

    /// Read `upsert` and `get` commands from stdin
    Shell,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let mut config = match &cli.config {
        Some(path) => DbConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => DbConfig::default(),
    };
    if let Some(path) = cli.storage_path {
        config = config.with_storage_path(path);
    }

    let db = SchemaDb::new(config)?;

    match cli.command {
        Commands::CreateSchema { name, file } => create_schema(&db, &name, &file),
        Commands::Describe { name, json } => describe(&db, &name, json),
        Commands::Shell => shell(&db),
    }
}

fn init_logging(level: &str) {
    // Logs go to stderr so shell output stays parseable.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn create_schema(db: &SchemaDb, name: &str, file: &Path) -> Result<()> {
    let body = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let request = CreateSchemaRequest::from_json(&body)?;
    let definition = db.create_schema_from_request(name, &request)?;

    println!("✓ Schema created");
    println!("  {}", definition);
    Ok(())
}

fn describe(db: &SchemaDb, name: &str, json: bool) -> Result<()> {
    let definition = db.describe_schema(name)?;
    if json {
        println!("{}", serde_json::to_string_pretty(definition.schema())?);
    } else {
        println!("{}", definition);
    }
    Ok(())
}

fn shell(db: &SchemaDb) -> Result<()> {
    info!("Reading commands from stdin");
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if matches!(line, "quit" | "exit") {
            break;
        }

        let output = match run_command(db, line) {
            Ok(output) => output,
            Err(e) => format!("error {}: {}", e.error_code(), e),
        };
        writeln!(stdout, "{}", output)?;
        stdout.flush()?;
    }

    Ok(())
}

/// Run one shell line: `upsert <schema> <json>`, `get <schema> <key>` or `describe <schema>`
fn run_command(db: &SchemaDb, line: &str) -> Result<String, DbError> {
    let mut parts = line.splitn(3, char::is_whitespace);
    let command = parts.next().unwrap_or_default();
    let schema = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or_default().trim_start();

    match command {
        "upsert" => {
            db.upsert_record(schema, rest)?;
            Ok("ok".to_string())
        }
        "get" => Ok(db
            .get_record(schema, rest)?
            .unwrap_or_else(|| "not found".to_string())),
        "describe" => Ok(db.describe_schema(schema)?.to_string()),
        other => Ok(format!(
            "unknown command '{}' (expected upsert, get, describe or quit)",
            other
        )),
    }
}
