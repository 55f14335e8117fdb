//! relbind Command-Line Inspector
//!
//! Loads an entity schema and prints the metadata the mapper derives from it:
//! entities, inferred relations and handler chains.

mod commands;
mod formatter;

use anyhow::Context;
use clap::Parser;
use commands::{Command, Session};
use formatter::OutputFormat;
use relbind::{MapperConfig, SchemaSet};
use std::path::PathBuf;

/// relbind Command-Line Inspector
#[derive(Parser, Debug)]
#[command(name = "relbind")]
#[command(version, about = "Inspect relbind entity schemas")]
pub struct Args {
    /// Mapper configuration file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Schema document (JSON); overrides the configured schema
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// Driver identifier (mysql or sqlite3)
    #[arg(long)]
    pub driver: Option<String>,

    /// Tags for synthesized join fields (e.g., "primary key;index")
    #[arg(long)]
    pub join_tags: Option<String>,

    /// Output format
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

fn main() {
    // Logs go to stderr so formatted output stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("relbind=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = mapper_config(&args)?;
    let schema_path = config
        .schema_path
        .clone()
        .context("no schema given; pass --schema or set schema_path in the config file")?;
    let schema = SchemaSet::from_json_file(&schema_path)
        .with_context(|| format!("failed to load schema {}", schema_path.display()))?;

    tracing::debug!(entities = schema.len(), schema = %schema_path.display(), "loaded schema");

    let session = Session::new(&config, schema)?;
    let formatter = formatter::create_formatter(args.format);
    let output = commands::execute(&session, &args.command, &*formatter)?;
    println!("{}", output);
    Ok(())
}

/// Build the mapper configuration from the config file and flags.
fn mapper_config(args: &Args) -> anyhow::Result<MapperConfig> {
    let mut config = match &args.config {
        Some(path) => MapperConfig::from_json_file(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => MapperConfig::default(),
    };

    if let Some(driver) = &args.driver {
        config.driver = driver.clone();
    }
    if let Some(schema) = &args.schema {
        config = config.with_schema_path(schema);
    }
    if let Some(tags) = &args.join_tags {
        config = config.with_join_tags(tags);
    }
    Ok(config)
}
