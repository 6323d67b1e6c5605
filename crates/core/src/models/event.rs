use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::UserId;

pub const DEFAULT_SCORE_UNIT: &str = "points";

/// A validated completion of one stage of a game, ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameCompletionEvent {
    pub game_id: String,
    pub game_name: String,
    pub score: i64,
    pub score_unit: String,
    pub duration_seconds: i64,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub session_id: Option<String>,
    pub stage: u32,
    pub total_stages: u32,
}

impl GameCompletionEvent {
    /// The final stage of a multi-stage workout.
    pub fn completes_session(&self) -> bool {
        self.stage == self.total_stages
    }
}

/// An event as persisted. `seq` is the insertion order and breaks ties between
/// events with the same completion time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEvent {
    pub event_id: String,
    #[serde(skip)]
    pub seq: i64,
    pub user_id: UserId,
    #[serde(flatten)]
    pub event: GameCompletionEvent,
    pub created_at: DateTime<Utc>,
}

impl StoredEvent {
    pub fn sort_key(&self) -> (DateTime<Utc>, i64) {
        (self.event.completed_at, self.seq)
    }
}

/// Sort events chronologically, earliest first, insertion order breaking ties.
pub fn sort_chronologically(events: &mut [StoredEvent]) {
    events.sort_by_key(StoredEvent::sort_key);
}
