//! Status command for showing running timers.

use std::fmt;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tt_db::Database;

use super::util::{format_clock, format_duration, user_error, write_field, write_section};

/// A running timer as reported by `tt status --json`.
#[derive(Debug, Serialize)]
pub struct JsonActiveTask {
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub running_seconds: i64,
}

pub fn run<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &Database,
    json: bool,
    now: &DateTime<Tz>,
) -> Result<()>
where
    Tz::Offset: fmt::Display,
{
    let tasks = db
        .list_active()
        .map_err(|err| user_error(err, "list active tasks"))?;
    let now_utc = now.with_timezone(&Utc);

    if json {
        let report: Vec<JsonActiveTask> = tasks
            .iter()
            .map(|task| JsonActiveTask {
                name: task.name.clone(),
                start_time: task.start_time,
                running_seconds: task.running_for(now_utc).num_seconds(),
            })
            .collect();
        let output =
            serde_json::to_string_pretty(&report).context("failed to serialize status")?;
        writeln!(writer, "{output}")?;
        return Ok(());
    }

    if tasks.is_empty() {
        writeln!(writer, "[ ] No active tasks.")?;
        return Ok(());
    }

    let tz = now.timezone();
    write_section(writer, "Active Tasks")?;
    for (i, task) in tasks.iter().enumerate() {
        if i > 0 {
            writeln!(writer)?;
        }
        writeln!(writer, "{}) {}", i + 1, task.name)?;
        write_field(writer, "started", format_clock(task.start_time, &tz))?;
        write_field(writer, "running", format_duration(task.running_for(now_utc)))?;
    }
    Ok(())
}
