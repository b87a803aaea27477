use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "feedharvest",
    author,
    version,
    about = "Discover short-form video links and accumulate them in a deduplicated store"
)]
pub struct Cli {
    /// Log at debug level and mirror the log to the terminal.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Discover items from a search results feed.
    Search {
        term: String,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Discover items from a channel: `@name`, `name`, or a profile URL.
    Channel {
        handle: String,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Summarise an existing store.
    Stats {
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Stop early once this many new items are found (needs a max).
    #[arg(long)]
    pub min: Option<usize>,
    #[arg(long)]
    pub max: Option<usize>,
    #[arg(long)]
    pub settle_ms: Option<u64>,
    #[arg(long)]
    pub stall_limit: Option<u32>,
    #[arg(long)]
    pub ceiling: Option<u32>,
    /// Store file; defaults to a name derived from the query inside --output-dir.
    #[arg(long)]
    pub store: Option<PathBuf>,
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,
    /// RON file with a `DiscoveryConfig`; flags override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub json: bool,
}
