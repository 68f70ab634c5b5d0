//! Storage layer for the task time tracker.
//!
//! Provides persistence for running timers and completed task logs using
//! `rusqlite`, plus the lifecycle transitions and aggregation queries built on
//! top of them.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! Every CLI invocation opens its own handle and runs one command to completion.
//! Multi-step mutations (stop, update, delete-all, migration) each run in a
//! single transaction, so a failure part way through leaves nothing behind.
//! Concurrent writers in separate processes are only as safe as `SQLite`'s own
//! locking makes them.
//!
//! # Schema
//!
//! ```text
//! active_task(task_name TEXT PRIMARY KEY, start_time TEXT NOT NULL)
//! task_log(id TEXT PRIMARY KEY, task_name TEXT NOT NULL, start_time TEXT NOT NULL,
//!          end_time TEXT NOT NULL, duration_seconds INTEGER NOT NULL)
//! ```
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 UTC with millisecond precision
//! (e.g., `2026-01-15T10:30:00.000Z`). The fixed width keeps lexicographic
//! ordering identical to chronological ordering, which the `end_time >= ?`
//! filters rely on.

mod active;
mod lifecycle;
mod log_id;
mod logs;
mod migrate;
mod summary;

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use thiserror::Error;
use tt_core::{ActiveTask, LogId, TaskLogEntry};

pub use lifecycle::{LogUpdate, StopAllSummary};
pub use log_id::MAX_ID_ATTEMPTS;
pub use logs::DeletedCounts;

/// Suggestion limit applied when callers pass zero.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 20;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A timer for this task is already running.
    #[error("task {name:?} is already active")]
    TaskAlreadyActive { name: String },
    /// No timer is running for this task.
    #[error("task {name:?} is not active")]
    TaskNotActive { name: String },
    /// No log entry has this identifier.
    #[error("log with id {id} not found")]
    LogNotFound { id: LogId },
    /// The interval ends before it starts.
    #[error("start time {start} is after end time {end}")]
    InvalidTimeRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// Every candidate identifier collided with an existing row.
    #[error("could not generate a unique log id for {table} after {attempts} attempts")]
    IdentifierSpaceExhausted {
        table: &'static str,
        attempts: usize,
    },
    /// The OS random source failed.
    #[error("random source failed: {0}")]
    Entropy(#[from] rand::Error),
    /// A stored timestamp could not be parsed.
    #[error("invalid timestamp in {column}: {value}")]
    TimestampParse {
        column: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is initialized (and legacy stores migrated) on open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened database");
        let mut db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&mut self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS active_task (
                task_name TEXT PRIMARY KEY,
                start_time TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS task_log (
                id TEXT PRIMARY KEY,
                task_name TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                duration_seconds INTEGER NOT NULL
            );
            ",
        )?;
        migrate::migrate_legacy_ids(&mut self.conn)?;
        migrate::canonicalize_timestamps(&mut self.conn)?;
        self.conn.execute_batch(
            "
            CREATE INDEX IF NOT EXISTS idx_task_log_end_time ON task_log(end_time);
            CREATE INDEX IF NOT EXISTS idx_task_log_task_name ON task_log(task_name);
            ",
        )?;
        Ok(())
    }
}

/// An `active_task` row before timestamp parsing.
#[derive(Debug)]
struct ActiveRow {
    name: String,
    start_time: String,
}

impl ActiveRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get(0)?,
            start_time: row.get(1)?,
        })
    }

    fn into_task(self) -> Result<ActiveTask, DbError> {
        Ok(ActiveTask {
            start_time: parse_timestamp(&self.start_time, "active_task.start_time")?,
            name: self.name,
        })
    }
}

/// A `task_log` row before timestamp parsing.
#[derive(Debug)]
struct LogRow {
    id: LogId,
    task_name: String,
    start_time: String,
    end_time: String,
    duration_seconds: i64,
}

impl LogRow {
    const COLUMNS: &'static str = "id, task_name, start_time, end_time, duration_seconds";

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            task_name: row.get(1)?,
            start_time: row.get(2)?,
            end_time: row.get(3)?,
            duration_seconds: row.get(4)?,
        })
    }

    fn into_entry(self) -> Result<TaskLogEntry, DbError> {
        Ok(TaskLogEntry {
            start_time: parse_timestamp(&self.start_time, "task_log.start_time")?,
            end_time: parse_timestamp(&self.end_time, "task_log.end_time")?,
            id: self.id,
            task_name: self.task_name,
            duration_seconds: self.duration_seconds,
        })
    }
}

/// Parses a stored timestamp.
///
/// Canonical values are RFC 3339. Stores written by older versions may hold
/// `SQLite` `datetime('now')` values (UTC, no offset) or values with a space
/// separator and numeric offset; both are accepted.
fn parse_timestamp(value: &str, column: &'static str) -> Result<DateTime<Utc>, DbError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|source| DbError::TimestampParse {
            column,
            value: value.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Builds a case-insensitive `LIKE` prefix pattern with wildcards escaped.
fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for ch in prefix.trim().chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch.to_ascii_lowercase());
    }
    pattern.push('%');
    pattern
}

fn suggestion_limit(limit: usize) -> i64 {
    let limit = if limit == 0 {
        DEFAULT_SUGGESTION_LIMIT
    } else {
        limit
    };
    i64::try_from(limit).unwrap_or(i64::MAX)
}
