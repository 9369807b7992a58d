//! # CloudSearch CLI (`csearch`)
//!
//! Builds CloudSearch queries from command-line flags and either prints the
//! rendered URL or runs the search and prints the results.
//!
//! ## Usage
//!
//! ```bash
//! csearch --config ./config/csearch.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `csearch url "<query>"` | Print the search URL without sending it |
//! | `csearch search "<query>"` | Run the search and print hits and facets |
//!
//! ## Examples
//!
//! ```bash
//! # Inspect the URL for a paged query
//! csearch url "star wars" --field title --field year --size 4 --page 2
//!
//! # Boolean query with OR-ed values and a facet constraint
//! csearch search --bq genre=Action --bq genre=Sci-Fi --facet genre --constraint genre=Sci-Fi
//!
//! # Raw JSON body
//! csearch search "star wars" --json
//! ```
//!
//! Set `RUST_LOG=cloudsearch_client=debug` to log each request URL.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use cloudsearch_client::config;
use cloudsearch_client::search::{self, SearchArgs};

/// CloudSearch CLI — build and run queries against a CloudSearch domain.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file with a `[cloudsearch]` table.
#[derive(Parser)]
#[command(
    name = "csearch",
    about = "Build and run CloudSearch queries",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/csearch.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the rendered search URL without sending a request.
    Url {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Run the search and print hits and facets.
    Search {
        #[command(flatten)]
        query: QueryArgs,

        /// Print the raw JSON response body.
        #[arg(long)]
        json: bool,
    },
}

/// Query parameters shared by `url` and `search`.
#[derive(Args)]
struct QueryArgs {
    /// Free-text query.
    query: Option<String>,

    /// Boolean clause as `field=value`. Repeat a field to OR its values.
    #[arg(long = "bq", value_parser = parse_key_val)]
    boolean: Vec<(String, String)>,

    /// Raw filter expression, e.g. `t-product_active=1`.
    #[arg(long = "filter")]
    filters: Vec<String>,

    /// Facet to compute.
    #[arg(long = "facet")]
    facets: Vec<String>,

    /// Facet constraint as `facet=value`.
    #[arg(long = "constraint", value_parser = parse_key_val)]
    constraints: Vec<(String, String)>,

    /// Field to return with each hit.
    #[arg(long = "field")]
    fields: Vec<String>,

    /// Rank expression, e.g. `-text_relevance`.
    #[arg(long)]
    rank: Option<String>,

    /// Results per page (default 10).
    #[arg(long)]
    size: Option<u32>,

    /// 1-based page number.
    #[arg(long, allow_hyphen_values = true)]
    page: Option<i64>,
}

impl From<QueryArgs> for SearchArgs {
    fn from(args: QueryArgs) -> Self {
        SearchArgs {
            query: args.query,
            boolean: args.boolean,
            filters: args.filters,
            facets: args.facets,
            constraints: args.constraints,
            fields: args.fields,
            rank: args.rank,
            size: args.size,
            page: args.page,
        }
    }
}

/// Parse a `key=value` pair for `--bq` and `--constraint` arguments.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Url { query } => {
            search::run_url(&cfg.cloudsearch, &query.into())?;
        }
        Commands::Search { query, json } => {
            search::run_search(&cfg.cloudsearch, &query.into(), json)?;
        }
    }

    Ok(())
}
