//! csiweb - command-line tool for Campbell-style data logger web APIs
//!
//! Queries tables, watches live data, checks the device clock and uploads
//! logger programs over the query-string web API.

mod commands;
mod config;
mod output;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use csiweb_client::{Credentials, CsiClient, OutputFormat as DeviceFormat, QueryMode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{Config, MergedConfig};
use crate::output::{OutputContext, OutputFormat};

/// Connection timeout; request timeout is configurable per invocation.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "csiweb")]
#[command(author, version, about = "Data logger web API CLI")]
#[command(propagate_version = true)]
struct Cli {
    /// Logger address (`host[:port]`)
    #[arg(short, long, env = "CSIWEB_LOGGER")]
    address: Option<String>,

    /// Comma-separated table list; discovered from the device when omitted
    #[arg(short, long, value_delimiter = ',')]
    tables: Option<Vec<String>>,

    /// Account name for authenticated loggers
    #[arg(short, long, env = "CSIWEB_USERNAME")]
    username: Option<String>,

    /// Account password
    #[arg(short, long, env = "CSIWEB_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,

    /// Configuration file path
    #[arg(short, long, env = "CSIWEB_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Minimal output (for scripting)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the logger's tables
    Tables,

    /// List the field names of a table
    Fields {
        /// Table name
        table: String,
    },

    /// Show the most recent record (every configured table when omitted)
    Latest {
        /// Table name
        table: Option<String>,
    },

    /// Run one query against a table
    Query {
        /// Table name
        table: String,

        /// Newest N records
        #[arg(long, group = "mode")]
        records: Option<u32>,

        /// Records since a timestamp (YYYY-MM-DDTHH:MM:SS[.ffffff])
        #[arg(long, group = "mode")]
        since: Option<String>,

        /// Records since a record id
        #[arg(long, group = "mode")]
        record: Option<u64>,

        /// Records between two timestamps
        #[arg(long, group = "mode", num_args = 2, value_names = ["START", "END"])]
        range: Option<Vec<String>>,

        /// Records in the trailing window, in seconds
        #[arg(long, group = "mode")]
        backfill: Option<u64>,

        /// Device output format: html, json, toa5, tob1, xml
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Poll the most recent record at a fixed interval
    Watch {
        /// Table name
        table: String,

        /// Seconds between samples
        #[arg(long, default_value = "60")]
        interval_secs: u64,

        /// Rolling buffer size; oldest samples dropped beyond this
        #[arg(long, default_value = "1440")]
        retention: usize,
    },

    /// Check the device clock
    Clock,

    /// Upload a program file to the device CPU drive
    Upload {
        /// Local program file
        file: PathBuf,

        /// Destination filename (defaults to the local file name)
        #[arg(long)]
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    // Load config file
    let config = if let Some(config_path) = &cli.config {
        Config::load_from(config_path)?
    } else {
        Config::load().unwrap_or_default()
    };

    // Merge CLI args with config
    let merged = config.merge_with_args(
        cli.address.as_deref(),
        cli.tables.clone(),
        cli.username.as_deref(),
        cli.no_color,
    )?;

    // Create output context
    let ctx = OutputContext::new(cli.output, merged.no_color, cli.quiet);

    // Execute command
    match &cli.command {
        Commands::Tables => {
            let client = create_client(&cli, &merged).await?;
            commands::tables(&client, &ctx)?;
        }

        Commands::Fields { table } => {
            let client = create_client(&cli, &merged).await?;
            commands::fields(&client, table, &ctx).await?;
        }

        Commands::Latest { table } => {
            let client = create_client(&cli, &merged).await?;
            commands::latest(&client, table.as_deref(), &ctx).await?;
        }

        Commands::Query {
            table,
            records,
            since,
            record,
            range,
            backfill,
            format,
        } => {
            let mode = resolve_mode(*records, since.as_deref(), *record, range.as_deref(), *backfill)?;
            let format: DeviceFormat = format
                .parse()
                .map_err(|e: String| anyhow::anyhow!("Invalid --format: {e}"))?;
            let client = create_client(&cli, &merged).await?;
            commands::query(&client, table, &mode, format, &ctx).await?;
        }

        Commands::Watch {
            table,
            interval_secs,
            retention,
        } => {
            let client = create_client(&cli, &merged).await?;
            commands::watch(&client, table, *interval_secs, *retention, &ctx).await?;
        }

        Commands::Clock => {
            let client = create_client(&cli, &merged).await?;
            commands::clock(&client, &ctx).await?;
        }

        Commands::Upload { file, name } => {
            let client = create_client(&cli, &merged).await?;
            commands::upload(&client, file, name.as_deref(), &ctx).await?;
        }
    }

    Ok(())
}

/// Build the client from merged configuration, discovering tables from the
/// device when no explicit list was given.
async fn create_client(cli: &Cli, merged: &MergedConfig) -> Result<CsiClient> {
    let credentials = match (&merged.username, &cli.password) {
        (Some(username), Some(password)) => Some(Credentials::new(username, password)),
        (Some(_), None) => bail!("Username given without a password (set CSIWEB_PASSWORD)"),
        (None, Some(_)) => bail!("Password given without a username"),
        (None, None) => None,
    };
    let timeout = Duration::from_secs(cli.timeout_secs.max(1));

    let client = match &merged.tables {
        Some(tables) => CsiClient::with_options(
            &merged.address,
            tables.clone(),
            credentials,
            timeout,
            CONNECT_TIMEOUT,
        )?,
        None => {
            tracing::debug!(address = %merged.address, "no table list given, discovering");
            CsiClient::discover_with_options(&merged.address, credentials, timeout, CONNECT_TIMEOUT)
                .await
                .context("Table discovery failed (pass --tables to skip it)")?
        }
    };
    Ok(client)
}

/// Resolve the query mode flags; exactly one must be present.
fn resolve_mode(
    records: Option<u32>,
    since: Option<&str>,
    record: Option<u64>,
    range: Option<&[String]>,
    backfill: Option<u64>,
) -> Result<QueryMode> {
    match (records, since, record, range, backfill) {
        (Some(n), None, None, None, None) => Ok(QueryMode::most_recent(n)),
        (None, Some(ts), None, None, None) => Ok(QueryMode::since_time(parse_time(ts)?)),
        (None, None, Some(id), None, None) => Ok(QueryMode::since_record(id)),
        (None, None, None, Some([start, end]), None) => {
            Ok(QueryMode::date_range(parse_time(start)?, parse_time(end)?))
        }
        (None, None, None, None, Some(secs)) => {
            Ok(QueryMode::backfill(Duration::from_secs(secs)))
        }
        _ => bail!(
            "Exactly one of --records, --since, --record, --range or --backfill is required"
        ),
    }
}

fn parse_time(s: &str) -> Result<NaiveDateTime> {
    csiweb_client::parse_device_time(s)
        .with_context(|| format!("Invalid timestamp '{s}' (expected YYYY-MM-DDTHH:MM:SS[.ffffff])"))
}
