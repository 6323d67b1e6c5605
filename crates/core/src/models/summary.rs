use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Running rollup of everything a user has completed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameplaySummary {
    pub total_games_completed: i64,
    pub total_score: i64,
    pub best_score: i64,
    pub total_workout_time_seconds: i64,
    pub fastest_completion_seconds: Option<i64>,
    pub sessions_played: i64,
    pub last_played_at: Option<DateTime<Utc>>,
    pub last_workout_completed_at: Option<DateTime<Utc>>,
    pub game_stats: BTreeMap<String, PerGameStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerGameStats {
    pub game_id: String,
    pub game_name: String,
    pub score_unit: String,
    pub times_played: i64,
    pub total_score: i64,
    pub best_score: i64,
    pub average_score: f64,
    pub total_time_seconds: i64,
    pub best_time_seconds: i64,
    pub last_score: i64,
    pub last_duration_seconds: i64,
    pub last_played_at: DateTime<Utc>,
}

impl GameplaySummary {
    /// Mean duration per completed game, one decimal place.
    pub fn average_completion_seconds(&self) -> f64 {
        if self.total_games_completed > 0 {
            crate::aggregate::round_one_decimal(
                self.total_workout_time_seconds as f64 / self.total_games_completed as f64,
            )
        } else {
            0.0
        }
    }

    /// Per-game stats, most played first.
    pub fn game_stats_by_popularity(&self) -> Vec<PerGameStats> {
        let mut stats: Vec<_> = self.game_stats.values().cloned().collect();
        stats.sort_by(|a, b| {
            b.times_played
                .cmp(&a.times_played)
                .then_with(|| a.game_id.cmp(&b.game_id))
        });
        stats
    }
}
