use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use fragment_host::util::{BreakpointPreset, RelativeTimeStyle};

/// Host news-site page fragments against an in-memory document.
#[derive(Parser, Debug)]
#[command(name = "fragment-host", version, about)]
pub struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load a page, start every fragment and print notifications as JSON lines
    Run(RunArgs),

    /// Resolve a viewport width to its breakpoint label
    Breakpoint {
        width: u32,

        /// Named table to use instead of the configured one
        #[arg(long)]
        preset: Option<BreakpointPreset>,
    },

    /// Format a timestamp relative to now
    RelativeTime {
        /// RFC 3339 timestamp or YYYY-MM-DD date
        timestamp: String,

        /// Reference "now" (defaults to the current time)
        #[arg(long)]
        now: Option<String>,

        #[arg(long, default_value_t = RelativeTimeStyle::Compact)]
        style: RelativeTimeStyle,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Page description (TOML)
    #[arg(long)]
    pub page: PathBuf,

    /// Time to let pass after startup
    #[arg(long, default_value_t = 0)]
    pub advance_ms: u64,

    /// Drive timers with the real clock instead of virtual time
    #[arg(long)]
    pub realtime: bool,

    /// Virtual clock origin (defaults to the current time)
    #[arg(long, conflicts_with = "realtime")]
    pub now: Option<String>,
}
