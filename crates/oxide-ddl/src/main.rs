//! oxide-ddl CLI
//!
//! Command-line tool for turning JSON operation lists into SQL scripts.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_ddl::prelude::*;

/// Dialect-specific DDL generation for schema migrations.
#[derive(Parser)]
#[command(name = "oxide-ddl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Built-in dialect presets.
#[derive(Clone, Copy, ValueEnum)]
enum Dialect {
    Oracle,
    SqlServer,
}

impl Dialect {
    fn config(self) -> DialectConfig {
        match self {
            Self::Oracle => DialectConfig::oracle(),
            Self::SqlServer => DialectConfig::sql_server(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the SQL script for an operation list.
    Generate {
        /// Dialect preset.
        #[arg(short, long, env = "OXIDE_DDL_DIALECT", value_enum, default_value = "oracle")]
        dialect: Dialect,

        /// Custom dialect configuration (JSON); overrides --dialect.
        #[arg(long, env = "OXIDE_DDL_DIALECT_CONFIG")]
        dialect_config: Option<PathBuf>,

        /// Operation list (JSON array).
        #[arg(short, long)]
        operations: PathBuf,

        /// Schema metadata (JSON).
        #[arg(short, long)]
        metadata: Option<PathBuf>,

        /// Write the script here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print a dialect preset as JSON.
    ShowDialect {
        /// Dialect preset.
        #[arg(short, long, value_enum, default_value = "oracle")]
        dialect: Dialect,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Generate {
            dialect,
            dialect_config,
            operations,
            metadata,
            output,
        } => {
            let config = match dialect_config {
                Some(path) => DialectConfig::load(&path)
                    .with_context(|| format!("loading dialect from {}", path.display()))?,
                None => dialect.config(),
            };
            info!("Using dialect: {}", config.name);

            let json = std::fs::read_to_string(&operations)
                .with_context(|| format!("reading {}", operations.display()))?;
            let ops: Vec<Operation> = serde_json::from_str(&json)
                .with_context(|| format!("parsing operations in {}", operations.display()))?;
            if ops.is_empty() {
                bail!("{} contains no operations", operations.display());
            }

            let schema = match metadata {
                Some(path) => {
                    let json = std::fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    SchemaMetadata::from_json(&json)
                        .with_context(|| format!("parsing metadata in {}", path.display()))?
                }
                None => SchemaMetadata::new(),
            };

            let script = SqlGenerator::new(config).generate(&ops, &schema)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, script.to_sql())
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!("Wrote {} statement(s) to {}", script.len(), path.display());
                }
                None => print!("{script}"),
            }
        }

        Commands::ShowDialect { dialect } => {
            println!("{}", serde_json::to_string_pretty(&dialect.config())?);
        }
    }

    Ok(())
}
