//! Calendar windows for dashboards, log listings and bulk deletes.
//!
//! All functions take the current time in the caller's timezone so period
//! boundaries land on local midnights. Results are returned in UTC, the
//! representation the store filters on.

use std::fmt;

use chrono::{
    DateTime, Datelike, Duration, LocalResult, Months, NaiveDate, NaiveTime, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;
const SECONDS_PER_WEEK: i64 = 7 * SECONDS_PER_DAY;

/// Dashboard period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    #[default]
    Today,
    Week,
    Month,
    AllTime,
}

impl Period {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Week => "this week",
            Self::Month => "this month",
            Self::AllTime => "all time",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A resolved dashboard window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub period: Period,
    /// Lower bound on `end_time`; `None` means unbounded.
    pub start: Option<DateTime<Utc>>,
    /// Whether an explicit `since` date was supplied.
    pub explicit_since: bool,
}

/// Denominator for percentage-of-period displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareBase {
    pub seconds: i64,
    pub label: String,
}

/// Log listing filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogRange {
    #[default]
    All,
    Today,
    /// The trailing seven days ending now.
    LastWeek,
    /// The trailing `n` × 24 hours ending now. Zero means unbounded.
    LastDays(u32),
}

/// Converts a local calendar date at midnight into an instant.
///
/// Ambiguous midnights (DST fall-back) resolve to the earlier instant. A
/// midnight inside a DST gap resolves to 01:00 local.
pub fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
        LocalResult::None => {
            let one_am = midnight + Duration::hours(1);
            tz.from_local_datetime(&one_am)
                .earliest()
                .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
        }
    }
}

/// Most recent Monday on or before `date`.
pub fn week_start_date(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// First day of the month containing `date`.
pub fn month_start_date(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Number of days in the month containing `date`.
pub fn days_in_month(date: NaiveDate) -> i64 {
    let first = month_start_date(date);
    first
        .checked_add_months(Months::new(1))
        .map_or(31, |next| next.signed_duration_since(first).num_days())
}

/// Natural start of `period` relative to `now`; `None` for all time.
pub fn period_start<Tz: TimeZone>(period: Period, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
    let tz = now.timezone();
    let today = now.date_naive();
    let date = match period {
        Period::Today => today,
        Period::Week => week_start_date(today),
        Period::Month => month_start_date(today),
        Period::AllTime => return None,
    };
    Some(local_midnight(&tz, date).with_timezone(&Utc))
}

/// Resolves a dashboard window.
///
/// An explicit `since` date replaces an unbounded start and tightens a bounded
/// one: the later of the two wins.
pub fn resolve_window<Tz: TimeZone>(
    period: Period,
    now: &DateTime<Tz>,
    since: Option<NaiveDate>,
) -> Window {
    let mut start = period_start(period, now);
    if let Some(date) = since {
        let explicit = local_midnight(&now.timezone(), date).with_timezone(&Utc);
        if start.is_none_or(|natural| explicit > natural) {
            start = Some(explicit);
        }
    }
    Window {
        period,
        start,
        explicit_since: since.is_some(),
    }
}

/// Fixed denominator for share-of-period percentages.
///
/// All-time windows use the seconds elapsed since an explicit `since`, or the
/// observed total when there is none. Both are floored at 1.
pub fn share_base<Tz: TimeZone>(window: &Window, now: &DateTime<Tz>, total_seconds: i64) -> ShareBase {
    match window.period {
        Period::Today => ShareBase {
            seconds: SECONDS_PER_DAY,
            label: "24h".to_string(),
        },
        Period::Week => ShareBase {
            seconds: SECONDS_PER_WEEK,
            label: "168h".to_string(),
        },
        Period::Month => {
            let days = days_in_month(now.date_naive());
            ShareBase {
                seconds: days * SECONDS_PER_DAY,
                label: format!("{}h ({days} days)", days * 24),
            }
        }
        Period::AllTime => match window.start.filter(|_| window.explicit_since) {
            Some(start) => {
                let elapsed = now.with_timezone(&Utc) - start;
                let local_date = start.with_timezone(&now.timezone()).date_naive();
                ShareBase {
                    seconds: elapsed.num_seconds().max(1),
                    label: format!("since {}", local_date.format("%Y-%m-%d")),
                }
            }
            None => ShareBase {
                seconds: total_seconds.max(1),
                label: "tracked total".to_string(),
            },
        },
    }
}

/// Percentage of `base` that `seconds` represents.
#[allow(clippy::cast_precision_loss)]
pub fn share_percent(seconds: i64, base: &ShareBase) -> f64 {
    seconds as f64 / base.seconds.max(1) as f64 * 100.0
}

/// Lower bound for a log listing.
pub fn log_range_start<Tz: TimeZone>(range: LogRange, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
    let now_utc = now.with_timezone(&Utc);
    match range {
        LogRange::All | LogRange::LastDays(0) => None,
        LogRange::Today => period_start(Period::Today, now),
        LogRange::LastWeek => Some(now_utc - Duration::days(7)),
        LogRange::LastDays(days) => Some(now_utc - Duration::hours(i64::from(days) * 24)),
    }
}

/// Lower bound for deleting the last `days` days: local midnight `days` days ago.
pub fn delete_days_start<Tz: TimeZone>(days: u32, now: &DateTime<Tz>) -> DateTime<Utc> {
    let date = now.date_naive() - Duration::days(i64::from(days));
    local_midnight(&now.timezone(), date).with_timezone(&Utc)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::FixedOffset;

    fn offset(hours: i32) -> FixedOffset {
        FixedOffset::east_opt(hours * 3600).unwrap()
    }

    fn local(tz: FixedOffset, y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<FixedOffset> {
        tz.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ========== Period Boundaries ==========

    #[test]
    fn today_starts_at_local_midnight() {
        let tz = offset(-5);
        let now = local(tz, 2026, 3, 4, 15, 30);
        let start = period_start(Period::Today, &now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 4, 5, 0, 0).unwrap());
    }

    #[test]
    fn week_starts_on_monday() {
        // Mar 4, 2026 is a Wednesday.
        assert_eq!(week_start_date(date(2026, 3, 4)), date(2026, 3, 2));
        // Mondays map to themselves, Sundays to the previous Monday.
        assert_eq!(week_start_date(date(2026, 3, 2)), date(2026, 3, 2));
        assert_eq!(week_start_date(date(2026, 3, 8)), date(2026, 3, 2));
    }

    #[test]
    fn week_period_start_is_monday_midnight() {
        let tz = offset(2);
        let now = local(tz, 2026, 3, 8, 23, 59);
        let start = period_start(Period::Week, &now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 1, 22, 0, 0).unwrap());
    }

    #[test]
    fn month_period_start_is_first_of_month() {
        let now = Utc.with_ymd_and_hms(2026, 2, 17, 8, 0, 0).unwrap();
        let start = period_start(Period::Month, &now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn all_time_has_no_start() {
        let now = Utc.with_ymd_and_hms(2026, 2, 17, 8, 0, 0).unwrap();
        assert_eq!(period_start(Period::AllTime, &now), None);
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(date(2024, 2, 10)), 29);
        assert_eq!(days_in_month(date(2026, 2, 10)), 28);
        assert_eq!(days_in_month(date(2026, 4, 30)), 30);
        assert_eq!(days_in_month(date(2026, 12, 31)), 31);
    }

    // ========== Since Overrides ==========

    #[test]
    fn since_sets_start_for_all_time() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap();
        let window = resolve_window(Period::AllTime, &now, Some(date(2026, 2, 1)));
        assert_eq!(
            window.start,
            Some(Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap())
        );
        assert!(window.explicit_since);
    }

    #[test]
    fn since_tightens_bounded_period() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap();
        let window = resolve_window(Period::Month, &now, Some(date(2026, 3, 3)));
        assert_eq!(
            window.start,
            Some(Utc.with_ymd_and_hms(2026, 3, 3, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn since_before_period_start_is_ignored() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap();
        let window = resolve_window(Period::Week, &now, Some(date(2026, 1, 1)));
        assert_eq!(
            window.start,
            Some(Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap())
        );
    }

    // ========== Share Base ==========

    #[test]
    fn share_base_is_fixed_for_bounded_periods() {
        let now = Utc.with_ymd_and_hms(2026, 2, 17, 8, 0, 0).unwrap();
        let today = share_base(&resolve_window(Period::Today, &now, None), &now, 100);
        assert_eq!(today.seconds, 86_400);
        assert_eq!(today.label, "24h");

        let week = share_base(&resolve_window(Period::Week, &now, None), &now, 100);
        assert_eq!(week.seconds, 604_800);
        assert_eq!(week.label, "168h");

        let month = share_base(&resolve_window(Period::Month, &now, None), &now, 100);
        assert_eq!(month.seconds, 28 * 86_400);
        assert_eq!(month.label, "672h (28 days)");
    }

    #[test]
    fn all_time_share_base_uses_observed_total() {
        let now = Utc.with_ymd_and_hms(2026, 2, 17, 8, 0, 0).unwrap();
        let window = resolve_window(Period::AllTime, &now, None);
        assert_eq!(share_base(&window, &now, 3_600).seconds, 3_600);
        assert_eq!(share_base(&window, &now, 0).seconds, 1);
        assert_eq!(share_base(&window, &now, 0).label, "tracked total");
    }

    #[test]
    fn all_time_share_base_uses_elapsed_since() {
        let now = Utc.with_ymd_and_hms(2026, 2, 3, 0, 0, 0).unwrap();
        let window = resolve_window(Period::AllTime, &now, Some(date(2026, 2, 1)));
        let base = share_base(&window, &now, 10);
        assert_eq!(base.seconds, 2 * 86_400);
        assert_eq!(base.label, "since 2026-02-01");
    }

    #[test]
    fn all_time_share_base_floors_future_since() {
        let now = Utc.with_ymd_and_hms(2026, 2, 3, 0, 0, 0).unwrap();
        let window = resolve_window(Period::AllTime, &now, Some(date(2026, 2, 10)));
        assert_eq!(share_base(&window, &now, 10).seconds, 1);
    }

    #[test]
    fn share_percent_divides_by_base() {
        let base = ShareBase {
            seconds: 86_400,
            label: "24h".to_string(),
        };
        let pct = share_percent(43_200, &base);
        assert!((pct - 50.0).abs() < f64::EPSILON);
    }

    // ========== Log and Delete Ranges ==========

    #[test]
    fn log_ranges_resolve_relative_to_now() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 18, 0, 0).unwrap();
        assert_eq!(log_range_start(LogRange::All, &now), None);
        assert_eq!(log_range_start(LogRange::LastDays(0), &now), None);
        assert_eq!(
            log_range_start(LogRange::Today, &now),
            Some(Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap())
        );
        assert_eq!(
            log_range_start(LogRange::LastWeek, &now),
            Some(Utc.with_ymd_and_hms(2026, 3, 3, 18, 0, 0).unwrap())
        );
        assert_eq!(
            log_range_start(LogRange::LastDays(2), &now),
            Some(Utc.with_ymd_and_hms(2026, 3, 8, 18, 0, 0).unwrap())
        );
    }

    #[test]
    fn delete_days_counts_back_from_midnight() {
        let tz = offset(1);
        let now = local(tz, 2026, 3, 10, 18, 0);
        assert_eq!(
            delete_days_start(0, &now),
            Utc.with_ymd_and_hms(2026, 3, 9, 23, 0, 0).unwrap()
        );
        assert_eq!(
            delete_days_start(3, &now),
            Utc.with_ymd_and_hms(2026, 3, 6, 23, 0, 0).unwrap()
        );
    }

    #[test]
    fn period_labels() {
        assert_eq!(Period::Today.to_string(), "today");
        assert_eq!(Period::AllTime.label(), "all time");
    }
}
