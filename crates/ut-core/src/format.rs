//! Output renderers for usage reports.

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use comfy_table::presets::ASCII_MARKDOWN;
use comfy_table::{Cell, CellAlignment, Table};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stats::StatEntry;

/// Report output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned table with a header row.
    #[default]
    Pretty,
    /// Tab-separated columns.
    Simple,
    /// JSON array with untruncated names.
    Json,
}

impl OutputFormat {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Simple => "simple",
            Self::Json => "json",
        }
    }

    /// Structured formats keep full names and every row.
    pub const fn is_structured(self) -> bool {
        matches!(self, Self::Json)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown format name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown output format: {0} (expected pretty, simple or json)")]
pub struct UnknownFormat(pub String);

impl FromStr for OutputFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretty" => Ok(Self::Pretty),
            "simple" => Ok(Self::Simple),
            "json" => Ok(Self::Json),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// Writes `entries` to `writer` in the given format.
///
/// `entries` must already be sorted and capped. Human-readable formats skip
/// rows with no time or no name; JSON writes every row.
pub fn render<W: Write>(
    writer: &mut W,
    format: OutputFormat,
    entries: &[StatEntry],
) -> io::Result<()> {
    match format {
        OutputFormat::Pretty => render_pretty(writer, entries),
        OutputFormat::Simple => render_simple(writer, entries),
        OutputFormat::Json => render_json(writer, entries),
    }
}

fn is_displayable(entry: &StatEntry) -> bool {
    !entry.name.is_empty() && entry.running_time != 0
}

fn render_pretty<W: Write>(writer: &mut W, entries: &[StatEntry]) -> io::Result<()> {
    let mut table = Table::new();
    table
        .load_preset(ASCII_MARKDOWN)
        .set_header(vec!["Name", "Duration", "Percentage"]);

    for entry in entries.iter().filter(|e| is_displayable(e)) {
        table.add_row(vec![
            Cell::new(&entry.name),
            Cell::new(format_duration(entry.running_time)),
            Cell::new(format_percentage(entry.percentage)).set_alignment(CellAlignment::Right),
        ]);
    }

    writeln!(writer, "{table}")
}

fn render_simple<W: Write>(writer: &mut W, entries: &[StatEntry]) -> io::Result<()> {
    writeln!(writer, "Name\tDuration\tPercentage")?;
    for entry in entries.iter().filter(|e| is_displayable(e)) {
        writeln!(
            writer,
            "{}\t{}\t{}",
            entry.name,
            format_duration(entry.running_time),
            format_percentage(entry.percentage)
        )?;
    }
    Ok(())
}

fn render_json<W: Write>(writer: &mut W, entries: &[StatEntry]) -> io::Result<()> {
    serde_json::to_writer(&mut *writer, entries)?;
    writeln!(writer)
}

/// Formats seconds as "Xh Ym Zs".
/// Negative durations are treated as zero.
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = seconds % 3600 / 60;
    let secs = seconds % 60;
    format!("{hours}h {minutes}m {secs}s")
}

/// Formats a percentage with two decimals.
pub fn format_percentage(percentage: f64) -> String {
    format!("{percentage:.2}")
}
