//! Stats command for reporting time spent per application or window.
//!
//! This module implements `ut stats` for the named periods (today, yesterday,
//! week, month) and explicit ranges, optionally broken down day by day.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use ut_core::{DaySpan, GroupBy, Period, StatsOptions, TimeRange, build_result_set, render};
use ut_db::{Database, Predicate};

use crate::Config;
use crate::cli::{StatsArgs, StatsPeriod};

/// What a stats invocation will cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// One report over a single range.
    Single(TimeRange),
    /// One report per day, most recent first.
    Daily(DaySpan),
}

/// A fully resolved stats request.
///
/// Building a plan validates user input, so a plan that exists can be run
/// without further usage errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsPlan {
    pub scope: Scope,
    pub name_filter: Option<String>,
    pub window_filter: Option<String>,
    pub options: StatsOptions,
}

impl StatsPlan {
    /// Resolves CLI arguments and configuration into a plan.
    pub fn resolve(period: &StatsPeriod, config: &Config, now: DateTime<Local>) -> Result<Self> {
        let today = now.date_naive();
        let scope = match period {
            StatsPeriod::Today(_) => Scope::Single(Period::Today.resolve(today)),
            StatsPeriod::Yesterday(_) => Scope::Single(Period::Yesterday.resolve(today)),
            StatsPeriod::Week(_) => Scope::Single(Period::ThisWeek.resolve(today)),
            StatsPeriod::Month(_) => Scope::Single(Period::ThisMonth.resolve(today)),
            StatsPeriod::Range(range) if range.by_day => Scope::Daily(
                DaySpan::from_bounds(range.start.as_deref(), range.end.as_deref(), now)
                    .context("invalid --start/--end for a daily breakdown")?,
            ),
            StatsPeriod::Range(range) => Scope::Single(
                TimeRange::from_bounds(range.start.as_deref(), range.end.as_deref(), now)
                    .context("invalid --start/--end")?,
            ),
        };

        let args = period.args();
        let plan = Self {
            scope,
            name_filter: args.name_filter.clone(),
            window_filter: args.window_filter.clone(),
            options: options(args, config),
        };
        tracing::debug!(?plan, "resolved stats plan");
        Ok(plan)
    }

    fn predicate(&self, range: TimeRange) -> Predicate {
        Predicate::new(range)
            .with_name_filter(self.name_filter.as_deref())
            .with_window_filter(self.window_filter.as_deref())
    }
}

/// CLI flags take precedence over configured defaults.
fn options(args: &StatsArgs, config: &Config) -> StatsOptions {
    let group_by = if args.by_window {
        GroupBy::Window
    } else {
        args.group_by.unwrap_or(config.group_by)
    };
    StatsOptions {
        group_by,
        format: args.format.unwrap_or(config.format),
        max_results: args.max_results.unwrap_or(config.max_results),
        max_name_length: args.max_name_length.unwrap_or(config.max_name_length),
    }
}

/// Runs the stats command, writing each report to `writer` as it completes.
pub fn run<W: Write>(writer: &mut W, db: &Database, plan: &StatsPlan) -> Result<()> {
    match &plan.scope {
        Scope::Single(range) => report(writer, db, plan, *range),
        Scope::Daily(span) => {
            for day in span.days() {
                if !plan.options.format.is_structured() {
                    writeln!(writer, "{}", day.format("%Y-%m-%d (%A)"))?;
                }
                report(writer, db, plan, TimeRange::day(day))
                    .with_context(|| format!("failed to report {day}"))?;
            }
            Ok(())
        }
    }
}

fn report<W: Write>(
    writer: &mut W,
    db: &Database,
    plan: &StatsPlan,
    range: TimeRange,
) -> Result<()> {
    let predicate = plan.predicate(range);
    let groups = db
        .group_totals(&predicate, plan.options.group_by)
        .context("failed to query interval totals")?;
    let entries = build_result_set(groups, &plan.options);
    render(writer, plan.options.format, &entries).context("failed to write report")?;
    Ok(())
}
