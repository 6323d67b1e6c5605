use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{PerGameStats, StoredEvent, UserId};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub attempt: u32,
    pub score: i64,
    pub completed_at: DateTime<Utc>,
}

/// Every score a user has posted for one game, oldest attempt first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreTrend {
    pub game_id: String,
    pub game_name: String,
    pub score_unit: String,
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutCalendar {
    pub year: i32,
    pub day_counts: Vec<CalendarDay>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Streak {
    pub current: u32,
    pub longest: u32,
}

/// Everything the progress page shows for a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub sessions_played: i64,
    pub total_games_completed: i64,
    pub total_score: i64,
    pub best_score: i64,
    pub total_workout_time_seconds: i64,
    pub average_completion_seconds: f64,
    pub fastest_completion_seconds: Option<i64>,
    pub last_played_at: Option<DateTime<Utc>>,
    pub last_workout_completed_at: Option<DateTime<Utc>>,
    pub game_stats: Vec<PerGameStats>,
    pub score_trends: Vec<ScoreTrend>,
    pub recent_completions: Vec<StoredEvent>,
    pub streak: Streak,
}
