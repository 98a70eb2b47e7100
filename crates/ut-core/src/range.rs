//! Time range resolution.
//!
//! Turns named periods (today, yesterday, this week, this month) and free-text
//! date bounds into a concrete [`TimeRange`]. Calendar arithmetic happens in
//! local time; the resolved boundaries are UTC instants.

use std::sync::LazyLock;

use chrono::{
    DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use regex::Regex;
use thiserror::Error;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").unwrap());

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

/// Errors raised while resolving a time range from user input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// Neither bound could be parsed, so the range would be unconstrained.
    #[error(
        "error parsing time range: neither start ({start:?}) nor end ({end:?}) is a valid date"
    )]
    Unparseable {
        start: Option<String>,
        end: Option<String>,
    },

    /// The start bound lies after the end bound.
    #[error("range start {start} is after range end {end}")]
    Inverted { start: String, end: String },

    /// A daily breakdown needs a first day to walk back to.
    #[error("a daily breakdown requires a start date")]
    MissingStart,
}

/// A named reporting period relative to the current day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Today,
    Yesterday,
    ThisWeek,
    ThisMonth,
}

impl Period {
    /// Resolves the period against `today`, a local calendar date.
    ///
    /// Only `Yesterday` has an upper bound; the others are open-ended.
    pub fn resolve(self, today: NaiveDate) -> TimeRange {
        match self {
            Self::Today => TimeRange::since(local_midnight_to_utc(today)),
            Self::Yesterday => TimeRange {
                start: Some(local_midnight_to_utc(today - Duration::days(1))),
                end: Some(local_midnight_to_utc(today)),
            },
            Self::ThisWeek => TimeRange::since(local_midnight_to_utc(week_start(today))),
            Self::ThisMonth => TimeRange::since(local_midnight_to_utc(month_start(today))),
        }
    }
}

/// A half-open time window with at least one bound.
///
/// `start` constrains interval start times (`>=`), `end` constrains interval
/// end times (`<=`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl TimeRange {
    /// Builds a range from optional bounds.
    ///
    /// Fails when both bounds are absent or when `start` is after `end`.
    pub fn new(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self, RangeError> {
        match (start, end) {
            (None, None) => Err(RangeError::Unparseable {
                start: None,
                end: None,
            }),
            (Some(s), Some(e)) if s > e => Err(RangeError::Inverted {
                start: s.to_rfc3339(),
                end: e.to_rfc3339(),
            }),
            _ => Ok(Self { start, end }),
        }
    }

    /// An open-ended range starting at `start`.
    pub const fn since(start: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    /// The local calendar day `date`, from its midnight to the next one.
    ///
    /// The last representable date has no next midnight and is left open.
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: Some(local_midnight_to_utc(date)),
            end: date.succ_opt().map(local_midnight_to_utc),
        }
    }

    /// Resolves free-text bounds into a range.
    ///
    /// Each bound is parsed independently and an unparseable bound is left
    /// open. Only when neither bound parses is the request rejected.
    pub fn from_bounds(
        start: Option<&str>,
        end: Option<&str>,
        now: DateTime<Local>,
    ) -> Result<Self, RangeError> {
        let parsed_start = start.and_then(|s| parse_datetime(s, now));
        let parsed_end = end.and_then(|s| parse_datetime(s, now));
        if parsed_start.is_none() && parsed_end.is_none() {
            return Err(RangeError::Unparseable {
                start: start.map(String::from),
                end: end.map(String::from),
            });
        }
        tracing::debug!(?parsed_start, ?parsed_end, "resolved explicit range");
        Self::new(parsed_start, parsed_end)
    }

    pub const fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    pub const fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }
}

/// Converts a local date at midnight to UTC.
///
/// Ambiguous midnights (DST fall-back) pick the earlier instant. A midnight
/// inside a DST gap resolves to 01:00 local.
pub fn local_midnight_to_utc(date: NaiveDate) -> DateTime<Utc> {
    local_to_utc(date.and_time(NaiveTime::MIN))
}

fn local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            let shifted = naive.checked_add_signed(Duration::hours(1))?;
            Local.from_local_datetime(&shifted).earliest()
        })
        .map_or_else(|| naive.and_utc(), |dt| dt.with_timezone(&Utc))
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let days_since_monday = date.weekday().num_days_from_monday();
    date - Duration::days(i64::from(days_since_monday))
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

/// Parses a date string in local time.
///
/// Supports:
/// - RFC 3339: "2026-01-15T10:30:00Z"
/// - Local date and time: "2026-01-15 10:30", "2026-01-15 10:30:00"
/// - Local date: "2026-01-15" (midnight), "2026-01" (first of the month)
/// - Time of day: "10:30" (today)
/// - Relative: "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago"
pub fn parse_datetime(s: &str, now: DateTime<Local>) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(naive) = DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(local_to_utc(naive));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(local_midnight_to_utc(date));
    }

    if let Ok(date) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
        return Some(local_midnight_to_utc(date));
    }

    if let Some(time) = TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
    {
        return Some(local_to_utc(now.date_naive().and_time(time)));
    }

    parse_relative(s, now)
}

/// Parses a date string and returns the local calendar day it falls on.
pub fn parse_date(s: &str, now: DateTime<Local>) -> Option<NaiveDate> {
    parse_datetime(s, now).map(|dt| dt.with_timezone(&Local).date_naive())
}

fn parse_relative(s: &str, now: DateTime<Local>) -> Option<DateTime<Utc>> {
    let caps = RELATIVE_TIME_RE.captures(s)?;
    let n: i64 = caps[1].parse().ok()?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        _ => return None,
    };

    if n > max_for_unit {
        return None;
    }

    Some((now - Duration::minutes(n * minutes_per_unit)).with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn local_date(dt: DateTime<Utc>) -> NaiveDate {
        dt.with_timezone(&Local).date_naive()
    }

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 29, 15, 0, 0).unwrap()
    }

    // ========== Named Periods ==========

    #[test]
    fn today_is_open_ended_from_midnight() {
        let range = Period::Today.resolve(date(2025, 1, 29));
        assert_eq!(local_date(range.start().unwrap()), date(2025, 1, 29));
        assert!(range.end().is_none());
    }

    #[test]
    fn yesterday_ends_at_start_of_today() {
        let range = Period::Yesterday.resolve(date(2025, 1, 29));
        assert_eq!(local_date(range.start().unwrap()), date(2025, 1, 28));
        assert_eq!(local_date(range.end().unwrap()), date(2025, 1, 29));
    }

    #[test]
    fn yesterday_across_month_boundary() {
        let range = Period::Yesterday.resolve(date(2025, 3, 1));
        assert_eq!(local_date(range.start().unwrap()), date(2025, 2, 28));
    }

    #[test]
    fn this_week_starts_on_monday() {
        // Jan 29, 2025 is a Wednesday
        let range = Period::ThisWeek.resolve(date(2025, 1, 29));
        assert_eq!(local_date(range.start().unwrap()), date(2025, 1, 27));
        assert!(range.end().is_none());
    }

    #[test]
    fn this_week_on_sunday_goes_back_six_days() {
        // Feb 2, 2025 is a Sunday
        assert_eq!(week_start(date(2025, 2, 2)), date(2025, 1, 27));
        // Jan 27, 2025 is a Monday
        assert_eq!(week_start(date(2025, 1, 27)), date(2025, 1, 27));
    }

    #[test]
    fn this_month_starts_on_the_first() {
        let range = Period::ThisMonth.resolve(date(2025, 1, 29));
        assert_eq!(local_date(range.start().unwrap()), date(2025, 1, 1));
        assert_eq!(month_start(date(2024, 2, 29)), date(2024, 2, 1));
    }

    #[test]
    fn day_range_spans_one_calendar_day() {
        let range = TimeRange::day(date(2025, 1, 29));
        assert_eq!(local_date(range.start().unwrap()), date(2025, 1, 29));
        assert_eq!(local_date(range.end().unwrap()), date(2025, 1, 30));
    }

    #[test]
    fn day_range_on_last_representable_date_is_open_ended() {
        let range = TimeRange::day(NaiveDate::MAX);
        assert!(range.start().is_some());
        assert!(range.end().is_none());
    }

    // ========== Explicit Ranges ==========

    #[test]
    fn explicit_range_with_both_bounds() {
        let range = TimeRange::from_bounds(Some("2025-01-01"), Some("2025-01-31"), fixed_now())
            .unwrap();
        assert_eq!(local_date(range.start().unwrap()), date(2025, 1, 1));
        assert_eq!(local_date(range.end().unwrap()), date(2025, 1, 31));
    }

    #[test]
    fn explicit_range_with_only_end_parsed_leaves_start_open() {
        let range =
            TimeRange::from_bounds(Some("not a date"), Some("2025-01-31"), fixed_now()).unwrap();
        assert!(range.start().is_none());
        assert_eq!(local_date(range.end().unwrap()), date(2025, 1, 31));
    }

    #[test]
    fn explicit_range_with_missing_start_leaves_start_open() {
        let range = TimeRange::from_bounds(None, Some("2025-01-31"), fixed_now()).unwrap();
        assert!(range.start().is_none());
    }

    #[test]
    fn explicit_range_with_no_parseable_bound_fails() {
        let err = TimeRange::from_bounds(Some("garbage"), Some("also garbage"), fixed_now())
            .unwrap_err();
        assert_eq!(
            err,
            RangeError::Unparseable {
                start: Some("garbage".to_string()),
                end: Some("also garbage".to_string()),
            }
        );
    }

    #[test]
    fn explicit_range_without_bounds_fails() {
        assert!(TimeRange::from_bounds(None, None, fixed_now()).is_err());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = TimeRange::from_bounds(Some("2025-02-01"), Some("2025-01-01"), fixed_now())
            .unwrap_err();
        assert!(matches!(err, RangeError::Inverted { .. }));
    }

    // ========== Date Parsing ==========

    #[test]
    fn parses_rfc3339() {
        let parsed = parse_datetime("2025-01-15T10:30:00Z", fixed_now()).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn parses_local_date_time() {
        let parsed = parse_datetime("2025-01-15 10:30", fixed_now()).unwrap();
        let local = parsed.with_timezone(&Local);
        assert_eq!(local.date_naive(), date(2025, 1, 15));
        assert_eq!(local.time(), NaiveTime::from_hms_opt(10, 30, 0).unwrap());
    }

    #[test]
    fn parses_year_month_as_first_day() {
        assert_eq!(parse_date("2025-03", fixed_now()), Some(date(2025, 3, 1)));
    }

    #[test]
    fn parses_time_of_day_as_today() {
        let parsed = parse_datetime("09:15", fixed_now()).unwrap();
        assert_eq!(local_date(parsed), date(2025, 1, 29));
    }

    #[test]
    fn parses_relative_days() {
        assert_eq!(parse_date("2 days ago", fixed_now()), Some(date(2025, 1, 27)));
        assert_eq!(parse_date("1 week ago", fixed_now()), Some(date(2025, 1, 22)));
    }

    #[test]
    fn rejects_unknown_formats() {
        assert!(parse_datetime("", fixed_now()).is_none());
        assert!(parse_datetime("yesterday-ish", fixed_now()).is_none());
        assert!(parse_datetime("2025-13-40", fixed_now()).is_none());
    }
}
