//! Shared utilities for CLI commands.

use std::fmt;
use std::io::{self, Write};
use std::sync::LazyLock;

use anyhow::Context;
use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;
use tt_db::DbError;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").unwrap());

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Date-and-time layouts interpreted in local time.
const LOCAL_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M", "%Y-%m-%d %I:%M %p"];

/// Clock-only layouts, interpreted as today in local time.
const CLOCK_FORMATS: [&str; 2] = ["%H:%M", "%I:%M %p"];

/// Parse a user-supplied time relative to `now`.
///
/// Supports:
/// - RFC 3339: "2026-01-15T10:30:00Z"
/// - Local date and time: "2026-01-15 14:30", "2026-01-15 2:30 PM"
/// - Local clock time today: "14:30", "2:30 PM"
/// - Relative: "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago"
pub fn parse_datetime<Tz: TimeZone>(s: &str, now: &DateTime<Tz>) -> anyhow::Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let tz = now.timezone();
    for format in LOCAL_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return resolve_local(&tz, &naive, s);
        }
    }
    for format in CLOCK_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(s, format) {
            let naive = now.date_naive().and_time(time);
            return resolve_local(&tz, &naive, s);
        }
    }

    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        anyhow::bail!(
            "Invalid time: {s}. Use RFC 3339, 'YYYY-MM-DD HH:MM', 'YYYY-MM-DD H:MM PM', 'HH:MM', 'H:MM PM', or relative (e.g., '2 hours ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    let duration = Duration::minutes(n * minutes_per_unit);
    Ok(now.with_timezone(&Utc) - duration)
}

/// Maps a local wall-clock time to an instant, taking the earlier side of a fold.
fn resolve_local<Tz: TimeZone>(
    tz: &Tz,
    naive: &NaiveDateTime,
    input: &str,
) -> anyhow::Result<DateTime<Utc>> {
    tz.from_local_datetime(naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("{input} does not exist in the local timezone"))
}

/// Formats seconds as `Xh Ym`, `Xm Ys` or `Xs`.
pub fn format_seconds(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

/// Formats a duration rounded to the nearest second.
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.num_milliseconds().max(0);
    format_seconds((millis + 500) / 1000)
}

/// Formats an instant as a local date and clock time, e.g. `Mar 2, 9:05 AM`.
pub fn format_datetime<Tz: TimeZone>(ts: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: fmt::Display,
{
    ts.with_timezone(tz).format("%b %-d, %-I:%M %p").to_string()
}

/// Formats an instant as a local clock time, e.g. `9:05 AM`.
pub fn format_clock<Tz: TimeZone>(ts: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: fmt::Display,
{
    ts.with_timezone(tz).format("%-I:%M %p").to_string()
}

/// Writes a boxed section title.
pub fn write_section<W: Write>(writer: &mut W, title: &str) -> io::Result<()> {
    let rule = "-".repeat(title.len() + 4);
    writeln!(writer, "{rule}")?;
    writeln!(writer, "  {title}")?;
    writeln!(writer, "{rule}")
}

/// Writes an indented `label: value` line with aligned values.
pub fn write_field<W: Write>(writer: &mut W, label: &str, value: impl fmt::Display) -> io::Result<()> {
    let label = format!("{label}:");
    writeln!(writer, "  {label:<9} {value}")
}

/// Converts a storage error into a user-facing error.
///
/// Business-rule failures already carry a readable message; everything else
/// is wrapped with what the command was trying to do.
pub fn user_error(err: DbError, action: &str) -> anyhow::Error {
    match err {
        DbError::TaskAlreadyActive { .. }
        | DbError::TaskNotActive { .. }
        | DbError::LogNotFound { .. }
        | DbError::InvalidTimeRange { .. } => anyhow::Error::new(err),
        other => anyhow::Error::new(other).context(format!("could not {action}")),
    }
}

/// Trims a task name, rejecting blank input.
pub fn task_name(raw: &str) -> anyhow::Result<&str> {
    Ok(tt_core::normalize_task_name(raw)?)
}
