//! Log store: completed task intervals keyed by log identifier.

use chrono::{DateTime, SubsecRound, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use rusqlite::{Connection, OptionalExtension, params};
use tt_core::{LogId, TaskLogEntry, TaskLogGroup};

use crate::log_id::{LogTable, unique_log_id};
use crate::{Database, DbError, LogRow, format_timestamp, like_prefix, suggestion_limit};

/// Rows removed by [`Database::delete_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletedCounts {
    pub logs: usize,
    pub active: usize,
}

impl Database {
    /// Records a completed interval under a fresh identifier.
    pub fn insert_log(
        &mut self,
        task_name: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<TaskLogEntry, DbError> {
        self.insert_log_with(task_name, start_time, end_time, &mut OsRng)
    }

    pub(crate) fn insert_log_with<R: RngCore + ?Sized>(
        &mut self,
        task_name: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<TaskLogEntry, DbError> {
        let start_time = start_time.trunc_subsecs(3);
        let end_time = end_time.trunc_subsecs(3);
        if end_time < start_time {
            return Err(DbError::InvalidTimeRange {
                start: start_time,
                end: end_time,
            });
        }
        let tx = self.conn.transaction()?;
        let id = unique_log_id(&tx, LogTable::TaskLog, rng)?;
        let entry = TaskLogEntry::new(id, task_name, start_time, end_time);
        insert_entry(&tx, LogTable::TaskLog, &entry)?;
        tx.commit()?;
        Ok(entry)
    }

    /// Fetches one log entry.
    pub fn get_log(&self, id: &LogId) -> Result<TaskLogEntry, DbError> {
        find_log(&self.conn, id)?.ok_or_else(|| DbError::LogNotFound { id: id.clone() })
    }

    /// Lists log entries, most recently ended first.
    ///
    /// With `since`, only entries whose `end_time` is at or after it.
    pub fn list_logs(&self, since: Option<DateTime<Utc>>) -> Result<Vec<TaskLogEntry>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "
            SELECT {}
            FROM task_log
            WHERE (?1 IS NULL OR end_time >= ?1)
            ORDER BY end_time DESC, id ASC
            ",
            LogRow::COLUMNS
        ))?;
        let rows = stmt.query_map([since.map(format_timestamp)], LogRow::from_row)?;
        let mut logs = Vec::new();
        for row in rows {
            logs.push(row?.into_entry()?);
        }
        Ok(logs)
    }

    /// Aggregates log entries per task, largest total first.
    pub fn list_logs_grouped(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<TaskLogGroup>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT task_name, SUM(duration_seconds) AS total_seconds, COUNT(*) AS session_count
            FROM task_log
            WHERE (?1 IS NULL OR end_time >= ?1)
            GROUP BY task_name
            ORDER BY total_seconds DESC, task_name ASC
            ",
        )?;
        let rows = stmt.query_map([since.map(format_timestamp)], |row| {
            Ok(TaskLogGroup {
                task_name: row.get(0)?,
                total_seconds: row.get(1)?,
                session_count: row.get(2)?,
            })
        })?;
        let mut groups = Vec::new();
        for row in rows {
            groups.push(row?);
        }
        Ok(groups)
    }

    /// Deletes one log entry.
    pub fn delete_log(&self, id: &LogId) -> Result<(), DbError> {
        let deleted = self
            .conn
            .execute("DELETE FROM task_log WHERE id = ?1", [id])?;
        if deleted == 0 {
            return Err(DbError::LogNotFound { id: id.clone() });
        }
        tracing::info!(%id, "deleted log");
        Ok(())
    }

    /// Deletes every entry whose `end_time` is at or after `since`.
    ///
    /// Returns the number removed; zero is not an error.
    pub fn delete_logs_since(&self, since: DateTime<Utc>) -> Result<usize, DbError> {
        let deleted = self.conn.execute(
            "DELETE FROM task_log WHERE end_time >= ?1",
            [format_timestamp(since)],
        )?;
        tracing::info!(deleted, %since, "deleted logs");
        Ok(deleted)
    }

    /// Clears both the log store and the active-task registry in one transaction.
    pub fn delete_all(&mut self) -> Result<DeletedCounts, DbError> {
        let tx = self.conn.transaction()?;
        let logs = tx.execute("DELETE FROM task_log", [])?;
        let active = tx.execute("DELETE FROM active_task", [])?;
        tx.commit()?;
        tracing::info!(logs, active, "deleted all data");
        Ok(DeletedCounts { logs, active })
    }

    /// Task names, logged or running, starting with `prefix` (case-insensitive).
    ///
    /// A `limit` of zero means [`DEFAULT_SUGGESTION_LIMIT`](crate::DEFAULT_SUGGESTION_LIMIT).
    pub fn name_suggestions(&self, prefix: &str, limit: usize) -> Result<Vec<String>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT name
            FROM (
                SELECT task_name AS name FROM task_log
                UNION
                SELECT task_name AS name FROM active_task
            )
            WHERE LOWER(name) LIKE ?1 ESCAPE '\\'
            ORDER BY name ASC
            LIMIT ?2
            ",
        )?;
        let rows = stmt.query_map(params![like_prefix(prefix), suggestion_limit(limit)], |row| {
            row.get(0)
        })?;
        let mut names = Vec::new();
        for row in rows {
            names.push(row?);
        }
        Ok(names)
    }
}

pub(crate) fn find_log(conn: &Connection, id: &LogId) -> Result<Option<TaskLogEntry>, DbError> {
    conn.query_row(
        &format!("SELECT {} FROM task_log WHERE id = ?1", LogRow::COLUMNS),
        [id],
        LogRow::from_row,
    )
    .optional()?
    .map(LogRow::into_entry)
    .transpose()
}

pub(crate) fn insert_entry(
    conn: &Connection,
    table: LogTable,
    entry: &TaskLogEntry,
) -> Result<(), DbError> {
    conn.execute(
        &format!(
            "
            INSERT INTO {} (id, task_name, start_time, end_time, duration_seconds)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            table.name()
        ),
        params![
            entry.id,
            entry.task_name,
            format_timestamp(entry.start_time),
            format_timestamp(entry.end_time),
            entry.duration_seconds,
        ],
    )?;
    Ok(())
}
