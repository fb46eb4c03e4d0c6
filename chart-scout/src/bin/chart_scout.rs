//! chart-scout command line
//!
//! Profiles a CSV file, prints chart suggestions for it, or renders a chart
//! spec against it. Results go to stdout as JSON; logs go to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chart_scout::charts::ChartSpec;
use chart_scout::core::{ScoutConfig, TableStore};
use chart_scout::logging::setup::{init_logging, LoggingConfig};
use chart_scout::sources::CsvSource;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct Input {
    /// CSV file to load
    path: PathBuf,

    /// Strict date format for text columns, e.g. %Y-%m-%d
    #[arg(long)]
    date_format: Option<String>,

    /// Field delimiter
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Highest distinct count still treated as low cardinality
    #[arg(long, default_value_t = chart_scout::analyzers::DEFAULT_LOW_CARDINALITY_THRESHOLD)]
    low_cardinality_threshold: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the column profile
    Profile {
        #[command(flatten)]
        input: Input,
    },
    /// Print chart suggestions
    Suggest {
        #[command(flatten)]
        input: Input,
    },
    /// Render a chart spec given as JSON, or `@file` to read it from a file
    Render {
        #[command(flatten)]
        input: Input,

        #[arg(long)]
        spec: String,

        /// Pretty-print the figure
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let crate_level = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    init_logging(
        LoggingConfig::default()
            .with_crate_level(crate_level)
            .with_json_format(args.json_logs),
    )
    .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    match args.command {
        Command::Profile { input } => {
            let store = load(&input).await?;
            print_json(&store.profile().await?, true)
        }
        Command::Suggest { input } => {
            let store = load(&input).await?;
            print_json(&store.suggest().await?, true)
        }
        Command::Render {
            input,
            spec,
            pretty,
        } => {
            let spec = read_spec(&spec)?;
            let store = load(&input).await?;
            print_json(&store.generate_chart(&spec).await?, pretty)
        }
    }
}

async fn load(input: &Input) -> Result<TableStore> {
    let delimiter = u8::try_from(input.delimiter)
        .context("delimiter must be a single-byte character")?;
    let config = ScoutConfig::builder()
        .delimiter(delimiter)
        .low_cardinality_threshold(input.low_cardinality_threshold)
        .build();

    let store = TableStore::with_config(config.clone());
    let source = CsvSource::from_path(&input.path).with_options(config.csv);
    store
        .load_source(&source, input.date_format.as_deref())
        .await
        .with_context(|| format!("failed to load {}", input.path.display()))?;
    Ok(store)
}

fn read_spec(spec: &str) -> Result<ChartSpec> {
    let json = match spec.strip_prefix('@') {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?
        }
        None => spec.to_string(),
    };
    Ok(ChartSpec::from_json_str(&json)?)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}
