//! Start/stop transitions and log edits that span both tables.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use rusqlite::{OptionalExtension, params};
use tt_core::{LogId, TaskLogEntry, non_negative};

use crate::log_id::{LogTable, unique_log_id};
use crate::logs::{find_log, insert_entry};
use crate::{Database, DbError, format_timestamp, parse_timestamp};

/// Result of stopping every running task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopAllSummary {
    pub stopped: usize,
    pub total: Duration,
}

/// Fields to change on a log entry. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogUpdate {
    pub task_name: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl LogUpdate {
    pub const fn is_empty(&self) -> bool {
        self.task_name.is_none() && self.start_time.is_none() && self.end_time.is_none()
    }
}

impl Database {
    /// Stops the timer for `name`, logging the interval. Returns time spent.
    pub fn stop(&mut self, name: &str) -> Result<Duration, DbError> {
        self.stop_at(name, Utc::now())
    }

    /// Stops the timer for `name` as of `now`.
    pub fn stop_at(&mut self, name: &str, now: DateTime<Utc>) -> Result<Duration, DbError> {
        self.stop_with(name, now, &mut OsRng)
    }

    /// Looks up the running timer, logs it and removes it in one transaction.
    ///
    /// A clock that reads earlier than the start logs a zero-length interval
    /// ending at the start time.
    pub(crate) fn stop_with<R: RngCore + ?Sized>(
        &mut self,
        name: &str,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Duration, DbError> {
        let tx = self.conn.transaction()?;
        let start_raw: Option<String> = tx
            .query_row(
                "SELECT start_time FROM active_task WHERE task_name = ?1",
                [name],
                |row| row.get(0),
            )
            .optional()?;
        let Some(start_raw) = start_raw else {
            return Err(DbError::TaskNotActive {
                name: name.to_string(),
            });
        };
        let start_time = parse_timestamp(&start_raw, "active_task.start_time")?;
        let duration = non_negative(now - start_time);
        let end_time = start_time + duration;

        let id = unique_log_id(&tx, LogTable::TaskLog, rng)?;
        let entry = TaskLogEntry::new(id, name, start_time, end_time);
        insert_entry(&tx, LogTable::TaskLog, &entry)?;

        let removed = tx.execute("DELETE FROM active_task WHERE task_name = ?1", [name])?;
        if removed != 1 {
            return Err(DbError::TaskNotActive {
                name: name.to_string(),
            });
        }
        tx.commit()?;

        tracing::info!(
            task = name,
            id = %entry.id,
            seconds = entry.duration_seconds,
            "stopped task"
        );
        Ok(duration)
    }

    /// Stops every running task, oldest first.
    pub fn stop_all(&mut self) -> Result<StopAllSummary, DbError> {
        self.stop_all_at(Utc::now())
    }

    /// Stops every running task as of `now`.
    ///
    /// Each stop commits on its own. The first failure is returned and tasks
    /// already stopped stay stopped.
    pub fn stop_all_at(&mut self, now: DateTime<Utc>) -> Result<StopAllSummary, DbError> {
        self.stop_all_with(now, &mut OsRng)
    }

    pub(crate) fn stop_all_with<R: RngCore + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<StopAllSummary, DbError> {
        let active = self.list_active()?;
        let mut total = Duration::zero();
        for task in &active {
            total += self.stop_with(&task.name, now, rng)?;
        }
        Ok(StopAllSummary {
            stopped: active.len(),
            total,
        })
    }

    /// Applies `update` to the log entry `id` and recomputes its duration.
    ///
    /// Fails with [`DbError::InvalidTimeRange`] if the result would end before
    /// it starts; the stored row is left untouched.
    pub fn update_log(&mut self, id: &LogId, update: &LogUpdate) -> Result<TaskLogEntry, DbError> {
        let tx = self.conn.transaction()?;
        let current =
            find_log(&tx, id)?.ok_or_else(|| DbError::LogNotFound { id: id.clone() })?;

        let task_name = update
            .task_name
            .clone()
            .unwrap_or_else(|| current.task_name.clone());
        let start_time = update
            .start_time
            .unwrap_or(current.start_time)
            .trunc_subsecs(3);
        let end_time = update.end_time.unwrap_or(current.end_time).trunc_subsecs(3);
        if end_time < start_time {
            return Err(DbError::InvalidTimeRange {
                start: start_time,
                end: end_time,
            });
        }

        let updated = TaskLogEntry::new(current.id, task_name, start_time, end_time);
        tx.execute(
            "
            UPDATE task_log
            SET task_name = ?1, start_time = ?2, end_time = ?3, duration_seconds = ?4
            WHERE id = ?5
            ",
            params![
                updated.task_name,
                format_timestamp(updated.start_time),
                format_timestamp(updated.end_time),
                updated.duration_seconds,
                updated.id,
            ],
        )?;
        tx.commit()?;

        tracing::info!(%id, seconds = updated.duration_seconds, "updated log");
        Ok(updated)
    }
}
