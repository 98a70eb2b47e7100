//! Storage layer for usage statistics.
//!
//! Interval records live in a single `intervals` table in a local `SQLite`
//! file, accessed through `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! Timestamps are stored as INTEGER unix seconds and `running_time` as INTEGER
//! seconds. Start and end times are indexed since every report filters on them.

mod predicate;

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OpenFlags, params, params_from_iter};
use thiserror::Error;
use ut_core::{GroupBy, GroupTotal};

pub use predicate::Predicate;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Database connection wrapper.
///
/// The connection closes when the value is dropped.
pub struct Database {
    conn: Connection,
}

/// One measured stretch of activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalRecord {
    pub name: String,
    pub window_name: String,
    /// Seconds of activity attributed to this interval.
    pub running_time: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Column holding the grouping key for each grouping mode.
const fn group_column(group_by: GroupBy) -> &'static str {
    match group_by {
        GroupBy::Name => "name",
        GroupBy::Window => "window_name",
    }
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an existing database for reading only.
    ///
    /// Fails if the file does not exist. The schema is not touched, so a file
    /// without an `intervals` table fails on the first query.
    pub fn open_read_only(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(Self { conn })
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS intervals (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                window_name TEXT NOT NULL DEFAULT '',
                running_time INTEGER NOT NULL CHECK (running_time >= 0),
                start_time INTEGER NOT NULL,
                end_time INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_intervals_start ON intervals(start_time);
            CREATE INDEX IF NOT EXISTS idx_intervals_end ON intervals(end_time);
            CREATE INDEX IF NOT EXISTS idx_intervals_name ON intervals(name);
            ",
        )?;
        Ok(())
    }

    /// Inserts a batch of interval records in one transaction.
    pub fn insert_intervals(&mut self, intervals: &[IntervalRecord]) -> Result<usize, DbError> {
        if intervals.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "
                INSERT INTO intervals (name, window_name, running_time, start_time, end_time)
                VALUES (?, ?, ?, ?, ?)
                ",
            )?;
            for interval in intervals {
                inserted += stmt.execute(params![
                    interval.name,
                    interval.window_name,
                    interval.running_time,
                    interval.start_time.timestamp(),
                    interval.end_time.timestamp(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Counts all stored interval records.
    pub fn interval_count(&self) -> Result<i64, DbError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM intervals", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Sums running time per group for records matching `predicate`.
    ///
    /// Each row also carries the total across all matching records, computed
    /// from the same filtered set, for use as a percentage denominator. Rows
    /// come back ordered by group key.
    pub fn group_totals(
        &self,
        predicate: &Predicate,
        group_by: GroupBy,
    ) -> Result<Vec<GroupTotal>, DbError> {
        let filter = predicate.to_sql();
        let key = group_column(group_by);
        let sql = format!(
            "
            WITH scoped AS (
                SELECT {key} AS group_key, running_time
                FROM intervals
                WHERE {clause}
            )
            SELECT group_key, SUM(running_time), (SELECT SUM(running_time) FROM scoped)
            FROM scoped
            GROUP BY group_key
            ORDER BY group_key ASC
            ",
            clause = filter.clause,
        );
        tracing::debug!(
            clause = %filter.clause,
            params = ?filter.params,
            %group_by,
            "querying group totals"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(filter.params.iter()), |row| {
            Ok(GroupTotal {
                key: row.get(0)?,
                running_time: row.get(1)?,
                scope_total: row.get(2)?,
            })
        })?;
        let mut totals = Vec::new();
        for row in rows {
            totals.push(row?);
        }
        tracing::debug!(groups = totals.len(), "group totals loaded");
        Ok(totals)
    }
}
