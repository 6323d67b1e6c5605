use chrono::{
    DateTime, Datelike, Days, Duration, Months, NaiveDate, NaiveTime, SubsecRound, TimeZone, Utc,
};

use crate::error::{Error, Result};
use crate::models::GoalPeriod;

/// Storage format for timestamps: UTC with millisecond precision, so that
/// lexicographic order equals chronological order.
const STORAGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Parse a client-supplied RFC 3339 timestamp. `label` names the field in the
/// error message.
pub fn parse_timestamp(input: Option<&str>, label: &str) -> Result<DateTime<Utc>> {
    let raw = input.map(str::trim).unwrap_or_default();

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).trunc_subsecs(3))
        .map_err(|_| Error::validation(format!("{} is invalid.", label)))
}

pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format(STORAGE_FORMAT).to_string()
}

pub fn parse_stored_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Corrupt timestamp '{}': {}", raw, e)))
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = first.and_then(|d| d.checked_add_months(Months::new(1)));

    match (first, next) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 31,
    }
}

pub fn days_in_year(year: i32) -> u32 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    }
}

/// Largest `days` target a goal may have for the period containing `today`.
pub fn max_days_for_period(period: GoalPeriod, today: NaiveDate) -> u32 {
    match period {
        GoalPeriod::Week => 7,
        GoalPeriod::Month => days_in_month(today.year(), today.month()),
        GoalPeriod::Year => days_in_year(today.year()),
    }
}

/// First day of the period containing `today`. Weeks start on Monday.
pub fn period_start(period: GoalPeriod, today: NaiveDate) -> NaiveDate {
    match period {
        GoalPeriod::Week => today - Duration::days(today.weekday().num_days_from_monday() as i64),
        GoalPeriod::Month => today.with_day(1).unwrap_or(today),
        GoalPeriod::Year => today.with_ordinal(1).unwrap_or(today),
    }
}

/// First day after the period that starts at `start`.
pub fn period_end(period: GoalPeriod, start: NaiveDate) -> NaiveDate {
    let next = match period {
        GoalPeriod::Week => start.checked_add_days(Days::new(7)),
        GoalPeriod::Month => start.checked_add_months(Months::new(1)),
        GoalPeriod::Year => start.checked_add_months(Months::new(12)),
    };
    next.unwrap_or(NaiveDate::MAX)
}

/// The `[start, end)` window of the period containing `now`, with day
/// boundaries taken at midnight in `now`'s time zone.
pub fn period_window<Tz: TimeZone>(
    period: GoalPeriod,
    now: &DateTime<Tz>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let tz = now.timezone();
    let start = period_start(period, now.date_naive());
    let end = period_end(period, start);

    (local_midnight(&tz, start), local_midnight(&tz, end))
}

fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);

    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}
