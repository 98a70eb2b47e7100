//! Per-entity usage totals and their share of the filtered scope.

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format::OutputFormat;

/// Which column interval records are grouped by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    /// Application name.
    #[default]
    Name,
    /// Window title.
    Window,
}

impl GroupBy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Window => "window",
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown grouping key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown grouping: {0} (expected name or window)")]
pub struct UnknownGroupBy(pub String);

impl FromStr for GroupBy {
    type Err = UnknownGroupBy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "window" => Ok(Self::Window),
            _ => Err(UnknownGroupBy(s.to_string())),
        }
    }
}

/// Summed running time for one group, as read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupTotal {
    pub key: String,
    /// Seconds attributed to this group.
    pub running_time: i64,
    /// Seconds across every group under the same filter.
    pub scope_total: i64,
}

/// One row of a usage report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatEntry {
    pub name: String,
    /// Seconds.
    pub running_time: i64,
    /// Share of the scope total, 0 to 100.
    pub percentage: f64,
}

/// Settings that shape a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsOptions {
    pub group_by: GroupBy,
    pub format: OutputFormat,
    pub max_results: usize,
    /// Applies to human-readable formats only.
    pub max_name_length: usize,
}

/// Turns grouped store rows into an ordered, capped report.
///
/// Percentages are computed against each row's scope total before the
/// result is capped, so dropping rows never changes the remaining shares.
/// A zero scope total yields an empty report.
pub fn build_result_set(groups: Vec<GroupTotal>, options: &StatsOptions) -> Vec<StatEntry> {
    let mut entries: Vec<StatEntry> = groups
        .into_iter()
        .filter(|group| group.scope_total > 0)
        .map(|group| StatEntry {
            percentage: percentage(group.running_time, group.scope_total),
            running_time: group.running_time,
            name: if options.format.is_structured() {
                group.key
            } else {
                truncate_name(group.key, options.max_name_length)
            },
        })
        .collect();

    // sort_by_key is stable: ties keep the store's grouping order
    entries.sort_by_key(|entry| Reverse(entry.running_time));
    entries.truncate(options.max_results);
    entries
}

#[allow(clippy::cast_precision_loss)]
fn percentage(value: i64, total: i64) -> f64 {
    value as f64 / total as f64 * 100.0
}

/// Truncates to at most `max_chars` characters.
fn truncate_name(name: String, max_chars: usize) -> String {
    match name.char_indices().nth(max_chars) {
        Some((byte_index, _)) => name[..byte_index].to_string(),
        None => name,
    }
}
