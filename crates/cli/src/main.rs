//! Mahardika CLI - fixture tooling and table browsing.
//!
//! # Usage
//!
//! ```bash
//! # Write the built-in sample data as YAML
//! np fixtures export --output fixtures.yaml
//!
//! # Validate a fixture file (duplicate ids, dangling references)
//! np fixtures check fixtures.yaml
//!
//! # Print a page of a table, exactly as the portal would list it
//! np browse admins --role admin --filter super
//! np browse policies --sort end_date --desc --page 2
//! ```
//!
//! # Commands
//!
//! - `fixtures export` - Write the sample data set
//! - `fixtures check` - Validate a fixture file
//! - `browse` - Print one browser page of a table

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "np")]
#[command(author, version, about = "Mahardika admin portal tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export or validate fixture files
    Fixtures {
        #[command(subcommand)]
        action: FixturesAction,
    },
    /// Print one page of a table
    Browse(BrowseArgs),
}

#[derive(Subcommand)]
enum FixturesAction {
    /// Write the built-in sample data as YAML
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a fixture file
    Check {
        /// Fixture file to validate
        file: PathBuf,
    },
}

/// Arguments for `np browse`.
#[derive(Args, Debug)]
pub struct BrowseArgs {
    /// Table to browse (customers, staff, admins, vehicles, policies, reports)
    pub table: String,

    /// Fixture file to browse instead of the sample data
    #[arg(long)]
    pub fixtures: Option<PathBuf>,

    /// Text filter
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Column the text filter applies to
    #[arg(long)]
    pub filter_by: Option<String>,

    /// Column to sort by
    #[arg(short, long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// 1-based page number
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page
    #[arg(long, default_value_t = 10)]
    pub page_size: usize,

    /// Role select filter (admin, staff, customer)
    #[arg(long)]
    pub role: Option<String>,

    /// Loyalty tier select filter
    #[arg(long)]
    pub tier: Option<String>,

    /// Status select filter (`all` to include archived vehicles)
    #[arg(long)]
    pub status: Option<String>,

    /// Policy type select filter
    #[arg(long = "type")]
    pub policy_type: Option<String>,
}

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Fixtures { action } => match action {
            FixturesAction::Export { output } => commands::fixtures::export(output.as_deref())?,
            FixturesAction::Check { file } => commands::fixtures::check(&file)?,
        },
        Commands::Browse(args) => commands::browse::run(&args).await?,
    }
    Ok(())
}
