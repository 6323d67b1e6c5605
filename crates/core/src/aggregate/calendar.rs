use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};

use crate::models::{CalendarDay, StoredEvent, Streak, WorkoutCalendar};

/// Per-day completion counts for `year`, bucketed by UTC calendar day.
pub fn calendar(events: &[StoredEvent], year: i32) -> WorkoutCalendar {
    let mut counts: BTreeMap<NaiveDate, u32> = BTreeMap::new();

    for stored in events {
        let day = stored.event.completed_at.date_naive();
        if day.year() == year {
            *counts.entry(day).or_insert(0) += 1;
        }
    }

    WorkoutCalendar {
        year,
        day_counts: counts
            .into_iter()
            .map(|(date, count)| CalendarDay {
                date: date.format("%Y-%m-%d").to_string(),
                count,
            })
            .collect(),
    }
}

/// Runs of consecutive active UTC days. The current streak is still alive if
/// the user played today or yesterday.
pub fn streak(events: &[StoredEvent], today: NaiveDate) -> Streak {
    let days: BTreeSet<NaiveDate> = events
        .iter()
        .map(|stored| stored.event.completed_at.date_naive())
        .collect();

    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for day in &days {
        run = match previous {
            Some(prev) if prev.succ_opt() == Some(*day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(*day);
    }

    let anchor = if days.contains(&today) {
        Some(today)
    } else {
        today.pred_opt().filter(|yesterday| days.contains(yesterday))
    };

    let mut current = 0;
    let mut cursor = anchor;
    while let Some(day) = cursor.filter(|d| days.contains(d)) {
        current += 1;
        cursor = day.pred_opt();
    }

    Streak { current, longest }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::aggregate::test_support::{event, stored};

    fn at(y: i32, m: u32, d: u32, h: u32) -> StoredEvent {
        let when = Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap();
        stored(when.timestamp(), event("memory-game", 1, when))
    }

    #[test]
    fn test_calendar_buckets_by_utc_day() {
        let events = vec![
            at(2024, 3, 1, 0),
            at(2024, 3, 1, 23),
            at(2024, 3, 2, 12),
            at(2023, 12, 31, 23),
            at(2025, 1, 1, 0),
        ];

        let cal = calendar(&events, 2024);
        assert_eq!(cal.year, 2024);
        assert_eq!(
            cal.day_counts,
            vec![
                CalendarDay { date: "2024-03-01".into(), count: 2 },
                CalendarDay { date: "2024-03-02".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_empty_calendar() {
        assert!(calendar(&[], 2024).day_counts.is_empty());
    }

    #[test]
    fn test_streak_alive_through_yesterday() {
        let events = vec![
            at(2024, 3, 1, 10),
            at(2024, 3, 2, 10),
            at(2024, 3, 2, 18),
            at(2024, 3, 3, 10),
            at(2024, 3, 5, 10),
            at(2024, 3, 6, 10),
        ];
        let today = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();

        assert_eq!(streak(&events, today), Streak { current: 2, longest: 3 });
    }

    #[test]
    fn test_streak_broken() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let events: Vec<_> = (0..4)
            .map(|i| stored(i, event("math", 1, t0 + Duration::days(i))))
            .collect();
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

        assert_eq!(streak(&events, today), Streak { current: 0, longest: 4 });
        assert_eq!(streak(&[], today), Streak::default());
    }
}
