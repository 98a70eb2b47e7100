//! Daily breakdown of a date range.

use std::iter::FusedIterator;

use chrono::{DateTime, Local, NaiveDate};

use crate::range::{RangeError, parse_date};

/// An inclusive span of local calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySpan {
    first: NaiveDate,
    last: NaiveDate,
}

impl DaySpan {
    /// Builds a span covering `first` through `last`, both inclusive.
    pub fn new(first: NaiveDate, last: NaiveDate) -> Result<Self, RangeError> {
        if first > last {
            return Err(RangeError::Inverted {
                start: first.to_string(),
                end: last.to_string(),
            });
        }
        Ok(Self { first, last })
    }

    /// Resolves free-text bounds into a span of days.
    ///
    /// The start bound is required. A missing or unparseable end bound
    /// defaults to the day of `now`.
    pub fn from_bounds(
        start: Option<&str>,
        end: Option<&str>,
        now: DateTime<Local>,
    ) -> Result<Self, RangeError> {
        let first = start.and_then(|s| parse_date(s, now));
        let last = end.and_then(|s| parse_date(s, now));
        match (first, last) {
            (None, None) => Err(RangeError::Unparseable {
                start: start.map(String::from),
                end: end.map(String::from),
            }),
            (None, Some(_)) => Err(RangeError::MissingStart),
            (Some(first), last) => Self::new(first, last.unwrap_or_else(|| now.date_naive())),
        }
    }

    pub const fn first(&self) -> NaiveDate {
        self.first
    }

    pub const fn last(&self) -> NaiveDate {
        self.last
    }

    /// Number of days in the span.
    pub fn len(&self) -> usize {
        usize::try_from((self.last - self.first).num_days() + 1).unwrap_or(0)
    }

    /// A span always holds at least one day.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Iterates the days from `last` back to `first`.
    ///
    /// Each call starts a fresh walk.
    pub const fn days(&self) -> Days {
        Days {
            next: Some(self.last),
            first: self.first,
        }
    }
}

impl IntoIterator for &DaySpan {
    type Item = NaiveDate;
    type IntoIter = Days;

    fn into_iter(self) -> Days {
        self.days()
    }
}

/// Most-recent-first walk over a [`DaySpan`].
#[derive(Debug, Clone)]
pub struct Days {
    next: Option<NaiveDate>,
    first: NaiveDate,
}

impl Iterator for Days {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next?;
        self.next = current.pred_opt().filter(|day| *day >= self.first);
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.next.map_or(0, |next| {
            usize::try_from((next - self.first).num_days() + 1).unwrap_or(0)
        });
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Days {}

impl FusedIterator for Days {}
