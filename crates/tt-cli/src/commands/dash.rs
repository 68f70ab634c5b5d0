//! Dashboard command: time per task with its share of the period.
//!
//! `tt dash` sums completed sessions over a calendar window (today, this week,
//! this month or all time, optionally tightened with `--since`) and shows each
//! task's share of a fixed base: 24h for a day, 168h for a week, the month's
//! length for a month. All-time views use the time elapsed since `--since`, or
//! the tracked total when there is no explicit start.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use tt_core::window::{resolve_window, share_base, share_percent};
use tt_core::{DurationSummary, Period, ShareBase, Window};
use tt_db::Database;

use super::util::{format_seconds, user_error, write_field, write_section};

/// Computed dashboard data.
#[derive(Debug)]
pub struct DashboardData {
    pub generated_at: DateTime<Utc>,
    pub window: Window,
    /// Local calendar date the window starts on, if bounded.
    pub start_date: Option<NaiveDate>,
    pub timezone: String,
    pub base: ShareBase,
    pub summary: DurationSummary,
}

/// Resolves the window and loads per-task totals.
pub fn generate_dashboard_data<Tz: TimeZone>(
    db: &Database,
    period: Period,
    since: Option<NaiveDate>,
    now: &DateTime<Tz>,
    timezone: String,
) -> Result<DashboardData> {
    let window = resolve_window(period, now, since);
    tracing::debug!(?window, "resolved dashboard window");

    let summary = db
        .duration_summary(window.start)
        .map_err(|err| user_error(err, "build dashboard"))?;
    let base = share_base(&window, now, summary.total_seconds);
    let start_date = window
        .start
        .map(|start| start.with_timezone(&now.timezone()).date_naive());

    Ok(DashboardData {
        generated_at: now.with_timezone(&Utc),
        window,
        start_date,
        timezone,
        base,
        summary,
    })
}

pub fn format_dashboard<W: Write>(writer: &mut W, data: &DashboardData) -> Result<()> {
    let period = data.window.period;
    if data.summary.is_empty() {
        writeln!(writer, "[ ] No logs found for {period}.")?;
        return Ok(());
    }

    write_section(writer, "Dashboard")?;
    write_field(writer, "period", period)?;
    if let Some(date) = data.start_date {
        write_field(writer, "since", date.format("%Y-%m-%d"))?;
    }
    write_field(writer, "total", format_seconds(data.summary.total_seconds))?;
    write_field(writer, "base", &data.base.label)?;

    for (i, row) in data.summary.rows.iter().enumerate() {
        writeln!(writer)?;
        writeln!(writer, "{}) {}", i + 1, row.task_name)?;
        write_field(writer, "time", format_seconds(row.total_seconds))?;
        write_field(
            writer,
            "share",
            format!("{:.1}%", share_percent(row.total_seconds, &data.base)),
        )?;
    }
    Ok(())
}

// ========== JSON Output ==========

#[derive(Debug, Serialize)]
pub struct JsonDashboard {
    pub generated_at: DateTime<Utc>,
    pub period: Period,
    pub since: Option<NaiveDate>,
    pub timezone: String,
    pub total_seconds: i64,
    pub base: JsonBase,
    pub tasks: Vec<JsonTaskShare>,
}

#[derive(Debug, Serialize)]
pub struct JsonBase {
    pub seconds: i64,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct JsonTaskShare {
    pub task_name: String,
    pub total_seconds: i64,
    pub share_percent: f64,
}

pub fn format_dashboard_json(data: &DashboardData) -> Result<String> {
    let report = JsonDashboard {
        generated_at: data.generated_at,
        period: data.window.period,
        since: data.start_date,
        timezone: data.timezone.clone(),
        total_seconds: data.summary.total_seconds,
        base: JsonBase {
            seconds: data.base.seconds,
            label: data.base.label.clone(),
        },
        tasks: data
            .summary
            .rows
            .iter()
            .map(|row| JsonTaskShare {
                task_name: row.task_name.clone(),
                total_seconds: row.total_seconds,
                share_percent: (share_percent(row.total_seconds, &data.base) * 10.0).round()
                    / 10.0,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&report).context("failed to serialize dashboard")
}

pub fn run<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &Database,
    period: Period,
    since: Option<NaiveDate>,
    json: bool,
    now: &DateTime<Tz>,
) -> Result<()> {
    let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());
    let data = generate_dashboard_data(db, period, since, now, timezone)?;

    if json {
        writeln!(writer, "{}", format_dashboard_json(&data)?)?;
    } else {
        format_dashboard(writer, &data)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use insta::assert_snapshot;

    /// Monday, 2 March 2026, 12:00 UTC.
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
    }

    fn seeded() -> Database {
        let mut db = Database::open_in_memory().unwrap();
        let t0 = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        db.insert_log("a", t0, t0 + Duration::seconds(60)).unwrap();
        db.insert_log("b", t0, t0 + Duration::seconds(40)).unwrap();
        let earlier = Utc.with_ymd_and_hms(2026, 2, 20, 9, 0, 0).unwrap();
        db.insert_log("old", earlier, earlier + Duration::hours(2))
            .unwrap();
        db
    }

    fn render(db: &Database, period: Period, since: Option<NaiveDate>) -> String {
        let data = generate_dashboard_data(db, period, since, &now(), "UTC".to_string()).unwrap();
        let mut out = Vec::new();
        format_dashboard(&mut out, &data).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn today_shares_of_24h() {
        let db = seeded();
        assert_snapshot!(render(&db, Period::Today, None), @r"
        -------------
          Dashboard
        -------------
          period:   today
          since:    2026-03-02
          total:    1m 40s
          base:     24h

        1) a
          time:     1m 0s
          share:    0.1%

        2) b
          time:     40s
          share:    0.0%
        ");
    }

    #[test]
    fn summary_totals_for_today() {
        let db = seeded();
        let data =
            generate_dashboard_data(&db, Period::Today, None, &now(), "UTC".to_string()).unwrap();
        let rows: Vec<(&str, i64)> = data
            .summary
            .rows
            .iter()
            .map(|row| (row.task_name.as_str(), row.total_seconds))
            .collect();
        assert_eq!(rows, vec![("a", 60), ("b", 40)]);
        assert_eq!(data.summary.total_seconds, 100);
    }

    #[test]
    fn all_time_uses_tracked_total() {
        let db = seeded();
        assert_snapshot!(render(&db, Period::AllTime, None), @r"
        -------------
          Dashboard
        -------------
          period:   all time
          total:    2h 1m
          base:     tracked total

        1) old
          time:     2h 0m
          share:    98.6%

        2) a
          time:     1m 0s
          share:    0.8%

        3) b
          time:     40s
          share:    0.5%
        ");
    }

    #[test]
    fn since_tightens_month_window() {
        let db = seeded();
        let since = NaiveDate::from_ymd_opt(2026, 3, 1);
        let data =
            generate_dashboard_data(&db, Period::Month, since, &now(), "UTC".to_string()).unwrap();
        assert_eq!(data.start_date, since);
        assert_eq!(data.base.label, "744h (31 days)");
        assert_eq!(data.summary.rows.len(), 2);
    }

    #[test]
    fn all_time_since_uses_elapsed_base() {
        let db = seeded();
        let since = NaiveDate::from_ymd_opt(2026, 3, 1);
        let data =
            generate_dashboard_data(&db, Period::AllTime, since, &now(), "UTC".to_string())
                .unwrap();
        assert_eq!(data.base.label, "since 2026-03-01");
        assert_eq!(data.base.seconds, 36 * 3600);
    }

    #[test]
    fn empty_period_message() {
        let db = Database::open_in_memory().unwrap();
        assert_snapshot!(render(&db, Period::Week, None), @"[ ] No logs found for this week.");
    }

    #[test]
    fn json_output() {
        let db = seeded();
        let data =
            generate_dashboard_data(&db, Period::Week, None, &now(), "UTC".to_string()).unwrap();
        assert_snapshot!(format_dashboard_json(&data).unwrap(), @r#"
        {
          "generated_at": "2026-03-02T12:00:00Z",
          "period": "week",
          "since": "2026-03-02",
          "timezone": "UTC",
          "total_seconds": 100,
          "base": {
            "seconds": 604800,
            "label": "168h"
          },
          "tasks": [
            {
              "task_name": "a",
              "total_seconds": 60,
              "share_percent": 0.0
            },
            {
              "task_name": "b",
              "total_seconds": 40,
              "share_percent": 0.0
            }
          ]
        }
        "#);
    }
}
