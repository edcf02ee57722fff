//! fcache - command-line access to a filecache directory

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use filecache::{LocalFileDriver, LocalFileOptions, LookupPolicy};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Cache directory
    #[arg(short, long, default_value = "./storage/cache")]
    dir: PathBuf,

    /// Return the newest valid record instead of the oldest
    #[arg(long)]
    latest: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Append a value for KEY
    Set {
        key: String,
        value: String,
        /// Time to live in seconds
        #[arg(short, long, default_value_t = 3600)]
        ttl: u64,
    },
    /// Print the value stored for KEY
    Get { key: String },
    /// Remove KEY and all of its history
    Delete { key: String },
    /// Exit 0 if KEY has a value, 1 otherwise
    Has { key: String },
    /// Remove every key in the directory
    Flush,
    /// Print every record in KEY's journal
    Inspect { key: String },
}

fn main() -> Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let options = LocalFileOptions {
        lookup: if args.latest {
            LookupPolicy::Latest
        } else {
            LookupPolicy::Earliest
        },
        ..Default::default()
    };
    let cache = LocalFileDriver::with_options(&args.dir, options)?;
    debug!(dir = %args.dir.display(), "cache opened");

    let mut out = std::io::stdout().lock();
    let success = commands::run(&cache, args.command, &mut out)?;

    let stats = cache.stats();
    debug!(
        hits = stats.hits(),
        misses = stats.misses(),
        writes = stats.writes(),
        deletes = stats.deletes(),
        "done"
    );

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
