use crate::aggregate::round_one_decimal;
use crate::models::event::sort_chronologically;
use crate::models::{GameCompletionEvent, GameplaySummary, PerGameStats, StoredEvent};

/// Fold one completion into a summary.
///
/// The result does not depend on arrival order: totals are sums and extremes,
/// and the "last" fields follow the event that completed latest, with ties
/// going to the one applied later.
pub fn apply_event(mut summary: GameplaySummary, event: &GameCompletionEvent) -> GameplaySummary {
    summary.total_games_completed = summary.total_games_completed.saturating_add(1);
    summary.total_score = summary.total_score.saturating_add(event.score);
    summary.best_score = summary.best_score.max(event.score);
    summary.total_workout_time_seconds = summary
        .total_workout_time_seconds
        .saturating_add(event.duration_seconds);
    summary.fastest_completion_seconds =
        Some(min_positive(summary.fastest_completion_seconds, event.duration_seconds));
    summary.last_played_at = summary.last_played_at.max(Some(event.completed_at));

    if event.completes_session() {
        summary.sessions_played = summary.sessions_played.saturating_add(1);
        summary.last_workout_completed_at = summary
            .last_workout_completed_at
            .max(Some(event.completed_at));
    }

    let stats = match summary.game_stats.remove(&event.game_id) {
        Some(prev) => {
            let times_played = prev.times_played.saturating_add(1);
            let total_score = prev.total_score.saturating_add(event.score);
            let best_score = prev.best_score.max(event.score);
            let total_time_seconds = prev.total_time_seconds.saturating_add(event.duration_seconds);
            let best_time_seconds =
                min_positive(Some(prev.best_time_seconds), event.duration_seconds);
            let latest = if event.completed_at >= prev.last_played_at {
                first_play(event)
            } else {
                prev
            };

            PerGameStats {
                times_played,
                total_score,
                best_score,
                average_score: round_one_decimal(total_score as f64 / times_played as f64),
                total_time_seconds,
                best_time_seconds,
                ..latest
            }
        }
        None => first_play(event),
    };
    summary.game_stats.insert(event.game_id.clone(), stats);

    summary
}

/// Rebuild a summary from scratch out of a user's full history.
pub fn replay(events: &[StoredEvent]) -> GameplaySummary {
    let mut ordered = events.to_vec();
    sort_chronologically(&mut ordered);

    ordered
        .iter()
        .fold(GameplaySummary::default(), |summary, stored| apply_event(summary, &stored.event))
}

fn first_play(event: &GameCompletionEvent) -> PerGameStats {
    PerGameStats {
        game_id: event.game_id.clone(),
        game_name: event.game_name.clone(),
        score_unit: event.score_unit.clone(),
        times_played: 1,
        total_score: event.score,
        best_score: event.score,
        average_score: event.score as f64,
        total_time_seconds: event.duration_seconds,
        best_time_seconds: event.duration_seconds,
        last_score: event.score,
        last_duration_seconds: event.duration_seconds,
        last_played_at: event.completed_at,
    }
}

fn min_positive(prev: Option<i64>, next: i64) -> i64 {
    match prev {
        Some(prev) if prev > 0 => prev.min(next),
        _ => next,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::aggregate::test_support::{event, stored};

    fn base_time() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_memory_game_scenario() {
        let summary = [10, 25, 15]
            .iter()
            .enumerate()
            .map(|(i, score)| event("memory-game", *score, base_time() + Duration::hours(i as i64)))
            .fold(GameplaySummary::default(), |s, e| apply_event(s, &e));

        let stats = &summary.game_stats["memory-game"];
        assert_eq!(stats.times_played, 3);
        assert_eq!(stats.best_score, 25);
        assert_eq!(stats.total_score, 50);
        assert_eq!(stats.average_score, 16.7);
        assert_eq!(stats.last_score, 15);
        assert_eq!(summary.total_games_completed, 3);
        assert_eq!(summary.sessions_played, 3);
    }

    #[test]
    fn test_fastest_and_best_time_track_minimum() {
        let mut slow = event("math", 1, base_time());
        slow.duration_seconds = 90;
        let mut fast = event("math", 1, base_time() + Duration::minutes(5));
        fast.duration_seconds = 30;
        let mut medium = event("math", 1, base_time() + Duration::minutes(10));
        medium.duration_seconds = 45;

        let summary = [slow, fast, medium]
            .iter()
            .fold(GameplaySummary::default(), apply_event);

        assert_eq!(summary.fastest_completion_seconds, Some(30));
        assert_eq!(summary.game_stats["math"].best_time_seconds, 30);
        assert_eq!(summary.game_stats["math"].last_duration_seconds, 45);
        assert_eq!(summary.total_workout_time_seconds, 165);
    }

    #[test]
    fn test_sessions_only_count_final_stages() {
        let mut summary = GameplaySummary::default();

        for stage in 1..=3 {
            let mut e = event("puzzle", 5, base_time() + Duration::minutes(stage as i64));
            e.stage = stage;
            e.total_stages = 3;
            e.session_id = Some("s-1".into());
            summary = apply_event(summary, &e);

            let expected = if stage == 3 { 1 } else { 0 };
            assert_eq!(summary.sessions_played, expected);
        }

        assert_eq!(summary.total_games_completed, 3);
        assert_eq!(
            summary.last_workout_completed_at,
            Some(base_time() + Duration::minutes(3))
        );
    }

    #[test]
    fn test_intermediate_stage_leaves_last_workout_untouched() {
        let mut e = event("puzzle", 5, base_time());
        e.stage = 1;
        e.total_stages = 2;

        let summary = apply_event(GameplaySummary::default(), &e);
        assert_eq!(summary.sessions_played, 0);
        assert_eq!(summary.last_workout_completed_at, None);
        assert_eq!(summary.last_played_at, Some(base_time()));
    }

    #[test]
    fn test_monotonic_totals() {
        let mut summary = GameplaySummary::default();
        let durations = [120, 40, 300, 40, 10];

        for (i, duration) in durations.iter().enumerate() {
            let mut e = event("zen", (i as i64) * 3, base_time() + Duration::minutes(i as i64));
            e.duration_seconds = *duration;

            let next = apply_event(summary.clone(), &e);
            assert!(next.total_games_completed > summary.total_games_completed);
            assert!(next.total_score >= summary.total_score);
            assert!(next.total_workout_time_seconds >= summary.total_workout_time_seconds);
            if let Some(prev_fastest) = summary.fastest_completion_seconds {
                assert!(next.fastest_completion_seconds.unwrap() <= prev_fastest);
            }
            summary = next;
        }
    }

    #[test]
    fn test_replay_is_deterministic_and_order_independent() {
        let events = vec![
            stored(3, event("memory-game", 15, base_time() + Duration::hours(2))),
            stored(1, event("memory-game", 10, base_time())),
            stored(2, event("math", 25, base_time() + Duration::hours(1))),
        ];

        let first = replay(&events);
        let second = replay(&events);
        assert_eq!(first, second);

        let mut reversed = events.clone();
        reversed.reverse();
        assert_eq!(replay(&reversed), first);
        assert_eq!(first.game_stats["memory-game"].last_score, 15);
        assert_eq!(first.last_played_at, Some(base_time() + Duration::hours(2)));
    }

    #[test]
    fn test_late_arrival_does_not_rewind_last_fields() {
        let mut newer = event("memory-game", 10, base_time());
        newer.game_name = "Memory Game v2".to_string();
        let older = event("memory-game", 99, base_time() - Duration::hours(1));

        let summary = [newer.clone(), older.clone()]
            .iter()
            .fold(GameplaySummary::default(), apply_event);

        let stats = &summary.game_stats["memory-game"];
        assert_eq!(summary.last_played_at, Some(base_time()));
        assert_eq!(summary.last_workout_completed_at, Some(base_time()));
        assert_eq!(stats.last_score, 10);
        assert_eq!(stats.last_played_at, base_time());
        assert_eq!(stats.game_name, "Memory Game v2");
        assert_eq!(stats.best_score, 99);

        let in_order = replay(&[stored(2, older), stored(1, newer)]);
        assert_eq!(summary, in_order);
    }

    #[test]
    fn test_ties_go_to_the_later_event() {
        let first = event("zen", 4, base_time());
        let second = event("zen", 7, base_time());

        let summary = [first.clone(), second.clone()]
            .iter()
            .fold(GameplaySummary::default(), apply_event);

        assert_eq!(summary.game_stats["zen"].last_score, 7);
        assert_eq!(summary, replay(&[stored(1, first), stored(2, second)]));
    }

    #[test]
    fn test_totals_saturate_instead_of_wrapping() {
        let huge = event("math", i64::MAX, base_time());

        let summary = [huge.clone(), huge]
            .iter()
            .fold(GameplaySummary::default(), apply_event);

        assert_eq!(summary.total_score, i64::MAX);
        assert_eq!(summary.game_stats["math"].total_score, i64::MAX);
        assert_eq!(summary.total_games_completed, 2);
    }
}
