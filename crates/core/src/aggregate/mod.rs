//! Pure aggregation over completion events.
//!
//! Nothing in here touches the store. The write path folds each new event
//! into the stored summary with [`apply_event`]; the read path derives trend,
//! calendar, streak and goal views from the event history.

mod calendar;
mod goals;
mod summary;
mod trends;

pub use calendar::{calendar, streak};
pub use goals::{goal_progress, percent};
pub use summary::{apply_event, replay};
pub use trends::score_trends;

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, Duration, Utc};

    use crate::models::{GameCompletionEvent, StoredEvent, UserId};

    pub fn event(game_id: &str, score: i64, completed_at: DateTime<Utc>) -> GameCompletionEvent {
        GameCompletionEvent {
            game_id: game_id.to_string(),
            game_name: format!("{} name", game_id),
            score,
            score_unit: "points".to_string(),
            duration_seconds: 60,
            started_at: completed_at - Duration::seconds(60),
            completed_at,
            session_id: None,
            stage: 1,
            total_stages: 1,
        }
    }

    pub fn stored(seq: i64, event: GameCompletionEvent) -> StoredEvent {
        StoredEvent {
            event_id: format!("evt-{}", seq),
            seq,
            user_id: UserId::new(),
            created_at: event.completed_at,
            event,
        }
    }
}
