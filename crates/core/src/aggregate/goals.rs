use std::collections::BTreeSet;

use chrono::{DateTime, TimeZone, Utc};

use crate::models::{GoalPeriod, GoalProgress, GoalSetting, StoredEvent};

/// `achieved / target` as a whole percentage, capped at 100.
pub fn percent(achieved: u32, target: u32) -> u32 {
    if target == 0 {
        return 0;
    }
    let raw = (achieved as f64 / target as f64 * 100.0).round() as u32;
    raw.min(100)
}

/// Measure `setting` against the events completed in `[start, end)`.
///
/// Active days are counted in `tz`, the zone the window was cut in; only
/// session-completing events count toward sessions.
pub fn goal_progress<Tz: TimeZone>(
    period: GoalPeriod,
    setting: GoalSetting,
    (start, end): (DateTime<Utc>, DateTime<Utc>),
    events: &[StoredEvent],
    tz: &Tz,
) -> GoalProgress {
    let in_window: Vec<_> = events
        .iter()
        .map(|stored| &stored.event)
        .filter(|event| event.completed_at >= start && event.completed_at < end)
        .collect();

    let achieved_days = in_window
        .iter()
        .map(|event| event.completed_at.with_timezone(tz).date_naive())
        .collect::<BTreeSet<_>>()
        .len() as u32;
    let achieved_sessions = in_window
        .iter()
        .filter(|event| event.completes_session())
        .count() as u32;

    let days_percent = percent(achieved_days, setting.days);
    let sessions_percent = percent(achieved_sessions, setting.target_sessions);
    let overall_percent = ((days_percent + sessions_percent) as f64 / 2.0).round() as u32;

    GoalProgress {
        period,
        start_date: start,
        end_date: end,
        target_days: setting.days,
        times_per_day: setting.times_per_day,
        target_sessions: setting.target_sessions,
        achieved_days,
        achieved_sessions,
        days_percent,
        sessions_percent,
        overall_percent,
    }
}
