//! `tt update`: edit the name or times of a logged session.

use std::fmt;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use tt_core::LogId;
use tt_db::{Database, LogUpdate};

use super::util::{format_datetime, format_seconds, parse_datetime, user_error, write_field};

/// Raw field values as given on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateFields<'a> {
    pub name: Option<&'a str>,
    pub start: Option<&'a str>,
    pub end: Option<&'a str>,
}

impl UpdateFields<'_> {
    /// Validates and parses the fields relative to `now`.
    pub fn resolve<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<LogUpdate> {
        let task_name = self
            .name
            .map(|name| {
                let trimmed = name.trim();
                if trimmed.is_empty() {
                    anyhow::bail!("--name cannot be empty");
                }
                Ok(trimmed.to_string())
            })
            .transpose()?;
        let start_time = self
            .start
            .map(|value| parse_datetime(value, now).context("invalid --start value"))
            .transpose()?;
        let end_time = self
            .end
            .map(|value| parse_datetime(value, now).context("invalid --end value"))
            .transpose()?;

        let update = LogUpdate {
            task_name,
            start_time,
            end_time,
        };
        if update.is_empty() {
            anyhow::bail!("provide at least one of --name, --start, or --end");
        }
        Ok(update)
    }
}

pub fn run<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &mut Database,
    id: &str,
    fields: UpdateFields<'_>,
    now: &DateTime<Tz>,
) -> Result<()>
where
    Tz::Offset: fmt::Display,
{
    let id = LogId::new(id.trim()).context("log id must be 8 characters from a-z and 0-9")?;
    let update = fields.resolve(now)?;

    let entry = db
        .update_log(&id, &update)
        .map_err(|err| user_error(err, "update log"))?;

    let tz = now.timezone();
    writeln!(writer, "[OK] Updated log {} ({})", entry.id, entry.task_name)?;
    write_field(writer, "start", format_datetime(entry.start_time, &tz))?;
    write_field(writer, "end", format_datetime(entry.end_time, &tz))?;
    write_field(writer, "total", format_seconds(entry.duration_seconds))?;
    Ok(())
}
