//! `InboxSorter` - rule-based mail sorting
//!
//! Command-line tools for checking a rules file and maintaining the
//! address cache used by sorting runs.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use inboxsorter_core::SorterConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default tracing filter when neither `RUST_LOG` nor the config sets one.
const DEFAULT_LOG_FILTER: &str = "inboxsorter=info,inboxsorter_core=info";

#[derive(Parser)]
#[command(name = "inboxsorter", version, about)]
struct Cli {
    /// Configuration file
    /// [default: <config dir>/inboxsorter/config.json]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the rules file and report rule counts and skipped rows.
    CheckRules,
    /// Show where a message would be routed.
    ///
    /// Only cached address mappings are used; the directory is never
    /// contacted.
    Classify {
        /// Sender address
        #[arg(long, default_value = "")]
        sender: String,
        /// Message subject
        #[arg(long, default_value = "")]
        subject: String,
        /// Message body
        #[arg(long, default_value = "")]
        body: String,
    },
    /// Dump the address cache to a JSON file for review.
    ExportCache {
        /// Output file
        path: PathBuf,
    },
    /// Replace the address cache with the entries of a JSON file.
    ///
    /// Addresses are trimmed and lowercased; for duplicates the first
    /// entry wins.
    ImportCache {
        /// Input file
        path: PathBuf,
    },
    /// Show the size of the address cache.
    CacheStats,
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("inboxsorter")
        .join("config.json")
}

fn init_logging(config: &SorterConfig) {
    let fallback = config
        .log_filter
        .clone()
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = SorterConfig::load(&config_path).await?;
    init_logging(&config);

    info!(config = %config_path.display(), "Starting InboxSorter");

    match cli.command {
        Command::CheckRules => commands::check_rules(&config).await,
        Command::Classify {
            sender,
            subject,
            body,
        } => commands::classify_message(&config, &sender, &subject, &body).await,
        Command::ExportCache { path } => commands::export_cache(&config, &path).await,
        Command::ImportCache { path } => commands::import_cache(&config, &path).await,
        Command::CacheStats => commands::cache_stats(&config).await,
    }
}
