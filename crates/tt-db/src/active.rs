//! Active-task registry: one running timer per task name.

use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::{OptionalExtension, params};
use tt_core::ActiveTask;

use crate::{ActiveRow, Database, DbError, format_timestamp, like_prefix, suggestion_limit};

impl Database {
    /// Starts a timer for `name` at the current time.
    pub fn start(&self, name: &str) -> Result<ActiveTask, DbError> {
        self.start_at(name, Utc::now())
    }

    /// Starts a timer for `name` at `now`.
    ///
    /// The conflict check and insert are one statement, so two starts for the
    /// same name cannot both succeed.
    pub fn start_at(&self, name: &str, now: DateTime<Utc>) -> Result<ActiveTask, DbError> {
        let now = now.trunc_subsecs(3);
        let inserted = self.conn.execute(
            "
            INSERT INTO active_task (task_name, start_time)
            VALUES (?1, ?2)
            ON CONFLICT(task_name) DO NOTHING
            ",
            params![name, format_timestamp(now)],
        )?;
        if inserted == 0 {
            return Err(DbError::TaskAlreadyActive {
                name: name.to_string(),
            });
        }
        tracing::info!(task = name, "started task");
        Ok(ActiveTask {
            name: name.to_string(),
            start_time: now,
        })
    }

    /// Lists running tasks, oldest first.
    pub fn list_active(&self) -> Result<Vec<ActiveTask>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT task_name, start_time
            FROM active_task
            ORDER BY start_time ASC, task_name ASC
            ",
        )?;
        let rows = stmt.query_map([], ActiveRow::from_row)?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?.into_task()?);
        }
        Ok(tasks)
    }

    /// Looks up the running timer for `name`.
    pub fn active_task(&self, name: &str) -> Result<Option<ActiveTask>, DbError> {
        self.conn
            .query_row(
                "SELECT task_name, start_time FROM active_task WHERE task_name = ?1",
                [name],
                ActiveRow::from_row,
            )
            .optional()?
            .map(ActiveRow::into_task)
            .transpose()
    }

    /// Discards the running timer for `name` without logging it.
    pub fn delete_active(&self, name: &str) -> Result<(), DbError> {
        let deleted = self
            .conn
            .execute("DELETE FROM active_task WHERE task_name = ?1", [name])?;
        if deleted == 0 {
            return Err(DbError::TaskNotActive {
                name: name.to_string(),
            });
        }
        tracing::info!(task = name, "discarded active task");
        Ok(())
    }

    /// Running task names starting with `prefix` (case-insensitive), sorted.
    ///
    /// A `limit` of zero means [`DEFAULT_SUGGESTION_LIMIT`](crate::DEFAULT_SUGGESTION_LIMIT).
    pub fn active_name_suggestions(
        &self,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<String>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT task_name
            FROM active_task
            WHERE LOWER(task_name) LIKE ?1 ESCAPE '\\'
            ORDER BY task_name ASC
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
