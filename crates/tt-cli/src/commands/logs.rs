//! `tt logs`: grouped or per-session listing of completed work.

use std::fmt;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use tt_core::LogRange;
use tt_core::window::log_range_start;
use tt_db::Database;

use super::util::{format_datetime, format_seconds, user_error, write_field, write_section};

/// Options for a log listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogsOptions {
    pub range: LogRange,
    pub separate: bool,
    pub json: bool,
}

pub fn run<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &Database,
    options: LogsOptions,
    now: &DateTime<Tz>,
) -> Result<()>
where
    Tz::Offset: fmt::Display,
{
    let since = log_range_start(options.range, now);
    tracing::debug!(?since, separate = options.separate, "listing logs");

    if options.separate {
        let entries = db
            .list_logs(since)
            .map_err(|err| user_error(err, "get task logs"))?;
        if options.json {
            let output =
                serde_json::to_string_pretty(&entries).context("failed to serialize logs")?;
            writeln!(writer, "{output}")?;
            return Ok(());
        }
        if entries.is_empty() {
            writeln!(writer, "[ ] No logs found.")?;
            return Ok(());
        }

        let tz = now.timezone();
        write_section(writer, "Task Logs (Separate Sessions)")?;
        for (i, entry) in entries.iter().enumerate() {
            if i > 0 {
                writeln!(writer)?;
            }
            writeln!(writer, "# {} {}", entry.id, entry.task_name)?;
            write_field(writer, "start", format_datetime(entry.start_time, &tz))?;
            write_field(writer, "end", format_datetime(entry.end_time, &tz))?;
            write_field(writer, "total", format_seconds(entry.duration_seconds))?;
        }
        return Ok(());
    }

    let groups = db
        .list_logs_grouped(since)
        .map_err(|err| user_error(err, "get grouped task logs"))?;
    if options.json {
        let output = serde_json::to_string_pretty(&groups).context("failed to serialize logs")?;
        writeln!(writer, "{output}")?;
        return Ok(());
    }
    if groups.is_empty() {
        writeln!(writer, "[ ] No logs found.")?;
        return Ok(());
    }

    write_section(writer, "Task Logs (Grouped)")?;
    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            writeln!(writer)?;
        }
        writeln!(writer, "{}) {}", i + 1, group.task_name)?;
        write_field(writer, "total", format_seconds(group.total_seconds))?;
        write_field(writer, "sessions", group.session_count)?;
    }
    Ok(())
}
