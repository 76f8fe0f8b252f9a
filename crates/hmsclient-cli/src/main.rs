//! hmsclient CLI - command-line access to a Hive Metastore.

use anyhow::Result;
use clap::{Parser, Subcommand};
use hmsclient_core::config::{Config, LogFormat};
use hmsclient_core::MetastoreConnection;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit codes for CLI operations.
///
/// Following Unix conventions:
/// - 0: Success
/// - 1-127: Application errors
#[repr(i32)]
#[derive(Debug, Clone, Copy)]
pub enum ExitCode {
    /// Successful execution
    Success = 0,
    /// Configuration error (invalid config file, bad endpoint)
    ConfigError = 1,
    /// Error reported by or on the way to the metastore
    MetastoreError = 2,
    /// Invalid command arguments (schema specs, partition values)
    InvalidArgument = 3,
    /// General runtime error
    RuntimeError = 10,
}

impl ExitCode {
    /// Convert an error to an exit code by inspecting its root cause.
    fn from_error(error: &anyhow::Error) -> Self {
        match error.downcast_ref::<hmsclient_core::Error>() {
            Some(hmsclient_core::Error::Config(_)) => ExitCode::ConfigError,
            Some(hmsclient_core::Error::Metastore(_)) => ExitCode::MetastoreError,
            Some(hmsclient_core::Error::InvalidArgument(_)) => ExitCode::InvalidArgument,
            Some(_) => ExitCode::RuntimeError,
            None if error.downcast_ref::<toml::de::Error>().is_some() => ExitCode::ConfigError,
            None => ExitCode::RuntimeError,
        }
    }
}

mod commands;

#[derive(Parser)]
#[command(name = "hmsclient")]
#[command(about = "Hive Metastore command-line client", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Metastore host, optionally `host:port` (falls back to HMS_HOST)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Metastore port (falls back to HMS_PORT, then 9083)
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Remote(RemoteCommand),

    /// Render compact `name:type` specs as tab-delimited columns
    Schema {
        #[arg(required = true)]
        specs: Vec<String>,
    },
}

/// Commands that talk to the metastore.
#[derive(Subcommand)]
enum RemoteCommand {
    /// List databases
    Databases,

    /// List tables in a database
    Tables { database: String },

    /// Show a table definition as JSON
    Table { database: String, table: String },

    /// Create a database
    CreateDatabase {
        name: String,

        /// Database comment
        #[arg(long)]
        comment: Option<String>,

        /// Database owner
        #[arg(long)]
        owner: Option<String>,
    },

    /// Drop a database and its data
    DropDatabase { name: String },

    /// List partition names of a table
    Partitions {
        database: String,
        table: String,

        /// Maximum number of names, -1 for all
        #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
        limit: i16,
    },

    /// Add a partition, deriving its location from the table
    AddPartition {
        database: String,
        table: String,

        /// Partition values in partition-key order
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Check whether a named partition (e.g. ds=2024-01-01) exists
    PartitionExists {
        database: String,
        table: String,
        name: String,
    },

    /// Drop partitions by name, or all of them with --all
    DropPartitions {
        database: String,
        table: String,

        /// Partition names such as ds=2024-01-01/hr=00
        #[arg(conflicts_with = "all")]
        names: Vec<String>,

        /// Drop every partition of the table
        #[arg(long)]
        all: bool,

        /// Ask the metastore to return the dropped partitions
        #[arg(long)]
        need_result: bool,
    },

    /// Show the current notification event id
    NotificationId,
}

#[tokio::main]
async fn main() {
    let exit_code = run_cli().await;
    std::process::exit(exit_code as i32);
}

/// Main CLI execution logic with proper error handling.
async fn run_cli() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            return ExitCode::from_error(&e);
        }
    };

    // Initialize logging
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match cli.verbose {
            0 => EnvFilter::new(config.monitoring.log_level.as_filter()),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so command output stays clean on stdout
    match config.monitoring.log_format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    }

    let result = execute_command(cli, config).await;

    match result {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            ExitCode::from_error(&e)
        }
    }
}

/// Execute the CLI command.
async fn execute_command(cli: Cli, config: Config) -> Result<()> {
    let command = match cli.command {
        Commands::Schema { specs } => return commands::schema::render(&specs),
        Commands::Remote(command) => command,
    };

    // Flags override the config file, which overrides the environment
    let mut metastore = config.metastore;
    if cli.host.is_some() {
        metastore.host = cli.host;
    }
    if cli.port.is_some() {
        metastore.port = cli.port;
    }
    let mut conn = MetastoreConnection::from_config(&metastore)?;
    tracing::debug!(endpoint = %conn.endpoint(), "Resolved metastore endpoint");

    match command {
        RemoteCommand::Databases => commands::catalog::databases(&mut conn).await?,
        RemoteCommand::Tables { database } => {
            commands::catalog::tables(&mut conn, database).await?
        }
        RemoteCommand::Table { database, table } => {
            commands::catalog::table(&mut conn, database, table).await?
        }
        RemoteCommand::CreateDatabase {
            name,
            comment,
            owner,
        } => commands::catalog::create_database(&mut conn, name, comment, owner).await?,
        RemoteCommand::DropDatabase { name } => {
            commands::catalog::drop_database(&mut conn, name).await?
        }
        RemoteCommand::Partitions {
            database,
            table,
            limit,
        } => commands::partitions::list(&mut conn, database, table, limit).await?,
        RemoteCommand::AddPartition {
            database,
            table,
            values,
        } => commands::partitions::add(&mut conn, database, table, values).await?,
        RemoteCommand::PartitionExists {
            database,
            table,
            name,
        } => commands::partitions::exists(&mut conn, database, table, name).await?,
        RemoteCommand::DropPartitions {
            database,
            table,
            names,
            all,
            need_result,
        } => {
            commands::partitions::drop(&mut conn, database, table, names, all, need_result).await?
        }
        RemoteCommand::NotificationId => commands::catalog::notification_id(&mut conn).await?,
    }

    Ok(())
}

fn load_config(path: &Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Ok(Config::from_file(path)?),
        None => Ok(Config::default()),
    }
}
