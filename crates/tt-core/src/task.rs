//! Task records: running timers, completed log entries, and derived views.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{LogId, ValidationError};

/// A task whose timer is currently running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTask {
    pub name: String,
    pub start_time: DateTime<Utc>,
}

impl ActiveTask {
    /// Time the task has been running as of `now`, never negative.
    pub fn running_for(&self, now: DateTime<Utc>) -> Duration {
        non_negative(now - self.start_time)
    }
}

/// A completed interval for a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLogEntry {
    pub id: LogId,
    pub task_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: i64,
}

impl TaskLogEntry {
    /// Builds an entry, deriving `duration_seconds` from the interval.
    pub fn new(
        id: LogId,
        task_name: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            task_name: task_name.into(),
            start_time,
            end_time,
            duration_seconds: elapsed_seconds(start_time, end_time),
        }
    }

    /// Stored duration as a [`Duration`].
    pub fn duration(&self) -> Duration {
        Duration::seconds(self.duration_seconds)
    }
}

/// Logged sessions for one task, aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLogGroup {
    pub task_name: String,
    pub total_seconds: i64,
    pub session_count: i64,
}

/// Total logged time for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDurationSummary {
    pub task_name: String,
    pub total_seconds: i64,
}

/// Per-task totals plus the grand total across all rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationSummary {
    pub rows: Vec<TaskDurationSummary>,
    pub total_seconds: i64,
}

impl DurationSummary {
    /// Builds a summary from ordered rows, computing the grand total.
    pub fn from_rows(rows: Vec<TaskDurationSummary>) -> Self {
        let total_seconds = rows.iter().map(|row| row.total_seconds).sum();
        Self {
            rows,
            total_seconds,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Trims a task name, rejecting names that are blank.
pub fn normalize_task_name(raw: &str) -> Result<&str, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::Empty { field: "task name" });
    }
    Ok(name)
}

/// Whole seconds between `start` and `end`, rounded to nearest and clamped at 0.
pub fn elapsed_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let millis = (end - start).num_milliseconds().max(0);
    (millis + 500) / 1000
}

/// Clamps negative durations (clock skew) to zero.
pub fn non_negative(duration: Duration) -> Duration {
    duration.max(Duration::zero())
}
