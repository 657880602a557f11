//! Scrobble-Ripple main entry point
//!
//! This is the command-line interface for the Scrobble-Ripple crawler.

use anyhow::Context;
use clap::{Parser, Subcommand};
use scrobble_ripple::config::{load_config_with_hash, validate, Config};
use scrobble_ripple::crawler::{crawl_histories, crawl_users, export_history};
use scrobble_ripple::output::{
    default_history_path, observer_for, print_batch_summary, print_expansion_summary,
};
use scrobble_ripple::storage::read_lines;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Scrobble-Ripple: a polite crawler for a paginated social music API
///
/// Discovers users reachable from a seed set through the friend graph,
/// keeping those whose profile matches a filter, and downloads users'
/// complete listening histories. All requests share one rate limit.
#[derive(Parser, Debug)]
#[command(name = "scrobble-ripple")]
#[command(version)]
#[command(about = "A polite crawler for a paginated social music API", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// API key to use for crawling (overrides the config file)
    #[arg(long, value_name = "KEY", global = true)]
    api_key: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the friend graph for users matching the accept filter
    Users {
        /// Seed name for crawling
        #[arg(short, long)]
        name: Option<String>,

        /// Seed file for crawling, one name per line
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Output file for accepted names, one per line
        #[arg(short, long, value_name = "FILE")]
        output: Option<String>,

        /// File recording users whose friends were already fetched
        #[arg(long, value_name = "FILE")]
        expanded: Option<String>,

        /// Value the accept field must equal
        #[arg(long, value_name = "VALUE")]
        accept_value: Option<String>,

        /// Stop once this many users have been accepted, earlier runs included
        #[arg(long, value_name = "N")]
        max_accepted: Option<u64>,
    },

    /// Download the scrobbles of every user in a names file as CSV
    Scrobbles {
        /// File containing user names, one per line
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Scrobble CSV file; created with a header if missing
        #[arg(short, long, value_name = "FILE")]
        output: Option<String>,

        /// File with names already scraped; created if missing
        #[arg(short = 'c', long, value_name = "FILE")]
        cache: Option<String>,
    },

    /// Export one user's full track history as JSON
    History {
        /// User name to look up
        user: String,

        /// Output file (default: <USER>.json)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(key) = &cli.api_key {
        config.api.api_key = key.clone();
    }

    match cli.command {
        Command::Users {
            name,
            input,
            output,
            expanded,
            accept_value,
            max_accepted,
        } => {
            if let Some(path) = output {
                config.output.names_path = path;
            }
            if let Some(path) = expanded {
                config.output.expanded_path = path;
            }
            if let Some(value) = accept_value {
                config.crawler.accept_value = value;
            }
            if let Some(cap) = max_accepted {
                config.crawler.max_accepted = cap;
            }
            validate(&config)?;
            handle_users(&config, name, input).await
        }
        Command::Scrobbles {
            input,
            output,
            cache,
        } => {
            if let Some(path) = output {
                config.output.scrobbles_path = path;
            }
            if let Some(path) = cache {
                config.output.done_path = path;
            }
            validate(&config)?;
            let input = input.unwrap_or_else(|| PathBuf::from(&config.output.names_path));
            handle_scrobbles(&config, input).await
        }
        Command::History { user, output } => {
            validate(&config)?;
            let output = output.unwrap_or_else(|| PathBuf::from(default_history_path(&user)));
            handle_history(&config, &user, output).await
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout is reserved for the progress table and summaries.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("scrobble_ripple=info,warn"),
            1 => EnvFilter::new("scrobble_ripple=debug,info"),
            2 => EnvFilter::new("scrobble_ripple=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the `users` command: friend-graph crawl
async fn handle_users(
    config: &Config,
    name: Option<String>,
    input: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut seeds = Vec::new();
    if let Some(path) = &input {
        seeds = read_lines(path)
            .with_context(|| format!("failed to read seed file {}", path.display()))?;
    }
    if let Some(name) = name.map(|n| n.trim().to_string()) {
        if !name.is_empty() && !seeds.contains(&name) {
            seeds.insert(0, name);
        }
    }

    tracing::info!(
        "Crawling from {} seeds, accepting {} == {}, cap {}",
        seeds.len(),
        config.crawler.accept_field,
        config.crawler.accept_value,
        config.crawler.max_accepted
    );

    let mut observer = observer_for("users", &["retrieved lists", "accepted", "queued"]);
    let summary = crawl_users(config, &seeds, observer.as_mut()).await?;

    let criterion = format!(
        "{} == {}",
        config.crawler.accept_field, config.crawler.accept_value
    );
    print_expansion_summary(&summary, &criterion);
    Ok(())
}

/// Handles the `scrobbles` command: batch history download
async fn handle_scrobbles(config: &Config, input: PathBuf) -> anyhow::Result<()> {
    tracing::info!(
        "Downloading histories for users in {} into {}",
        input.display(),
        config.output.scrobbles_path
    );

    let mut observer = observer_for("scrobbles", &["users", "songs", "to go"]);
    let summary = crawl_histories(config, &input, observer.as_mut()).await?;

    print_batch_summary(&summary);
    Ok(())
}

/// Handles the `history` command: single-user JSON export
async fn handle_history(config: &Config, user: &str, output: PathBuf) -> anyhow::Result<()> {
    let count = export_history(config, user, &output).await?;
    println!("Wrote {} entries to {}", count, output.display());
    Ok(())
}
