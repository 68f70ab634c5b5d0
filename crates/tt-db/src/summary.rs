//! Aggregation queries over the log store.

use chrono::{DateTime, Utc};
use tt_core::{DurationSummary, TaskDurationSummary};

use crate::{Database, DbError, format_timestamp};

impl Database {
    /// Total logged seconds per task for entries ending at or after `since`.
    ///
    /// Rows are ordered by total descending, then task name. Running timers
    /// are not included.
    pub fn duration_summary(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<DurationSummary, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT task_name, SUM(duration_seconds) AS total
            FROM task_log
            WHERE (?1 IS NULL OR end_time >= ?1)
            GROUP BY task_name
            ORDER BY total DESC, task_name ASC
            ",
        )?;
        let rows = stmt.query_map([since.map(format_timestamp)], |row| {
            Ok(TaskDurationSummary {
                task_name: row.get(0)?,
                total_seconds: row.get(1)?,
            })
        })?;
        let mut summaries = Vec::new();
        for row in rows {
            summaries.push(row?);
        }
        Ok(DurationSummary::from_rows(summaries))
    }
}
