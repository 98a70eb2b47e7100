//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ut_core::{GroupBy, OutputFormat};

/// Usage statistics for tracked applications and windows.
///
/// Reports how much active time was spent per application or window title
/// within a period, read from the local interval database.
#[derive(Debug, Parser)]
#[command(name = "ut", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show database location and record count.
    Status,

    /// Show time spent per application or window.
    Stats {
        #[command(subcommand)]
        period: StatsPeriod,
    },
}

/// Periods a report can cover.
#[derive(Debug, Subcommand)]
pub enum StatsPeriod {
    /// Since midnight today.
    Today(StatsArgs),

    /// Yesterday, midnight to midnight.
    Yesterday(StatsArgs),

    /// Since Monday of the current week.
    Week(StatsArgs),

    /// Since the first day of the current month.
    Month(StatsArgs),

    /// An explicit date range.
    Range(RangeArgs),
}

impl StatsPeriod {
    pub const fn args(&self) -> &StatsArgs {
        match self {
            Self::Today(args) | Self::Yesterday(args) | Self::Week(args) | Self::Month(args) => {
                args
            }
            Self::Range(range) => &range.stats,
        }
    }
}

/// Bounds for an explicit range.
#[derive(Debug, Clone, Default, Args)]
pub struct RangeArgs {
    /// Range start (e.g., 2025-01-27, "2025-01-27 09:00", "3 days ago").
    #[arg(long)]
    pub start: Option<String>,

    /// Range end, same formats as --start.
    #[arg(long)]
    pub end: Option<String>,

    /// Print one report per day, most recent first.
    #[arg(long)]
    pub by_day: bool,

    #[command(flatten)]
    pub stats: StatsArgs,
}

/// Options shared by every report.
#[derive(Debug, Clone, Default, Args)]
pub struct StatsArgs {
    /// Group by this key (name or window).
    #[arg(long, value_name = "KEY")]
    pub group_by: Option<GroupBy>,

    /// Group by window title, shorthand for --group-by window.
    #[arg(short = 'w', long, conflicts_with = "group_by")]
    pub by_window: bool,

    /// Only count applications whose name contains this text.
    #[arg(long = "name", value_name = "TEXT")]
    pub name_filter: Option<String>,

    /// Only count windows whose title contains this text.
    #[arg(long = "window", value_name = "TEXT")]
    pub window_filter: Option<String>,

    /// Output format (pretty, simple, json).
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Maximum number of rows to show.
    #[arg(short = 'n', long)]
    pub max_results: Option<usize>,

    /// Truncate names longer than this in pretty and simple output.
    #[arg(long)]
    pub max_name_length: Option<usize>,
}
