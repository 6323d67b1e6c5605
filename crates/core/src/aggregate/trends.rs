use crate::models::event::sort_chronologically;
use crate::models::{ScoreTrend, StoredEvent, TrendPoint};

/// One score series per game, in the order games were first played.
///
/// Attempts are numbered from 1 by completion time; events completed at the
/// same instant keep their insertion order.
pub fn score_trends(events: &[StoredEvent]) -> Vec<ScoreTrend> {
    let mut ordered = events.to_vec();
    sort_chronologically(&mut ordered);

    let mut trends: Vec<ScoreTrend> = Vec::new();

    for stored in ordered {
        let event = stored.event;
        if event.game_id.is_empty() {
            continue;
        }

        let index = match trends.iter().position(|t| t.game_id == event.game_id) {
            Some(index) => index,
            None => {
                trends.push(ScoreTrend {
                    game_id: event.game_id.clone(),
                    game_name: event.game_name.clone(),
                    score_unit: event.score_unit.clone(),
                    points: Vec::new(),
                });
                trends.len() - 1
            }
        };

        let series = &mut trends[index];
        series.points.push(TrendPoint {
            attempt: series.points.len() as u32 + 1,
            score: event.score,
            completed_at: event.completed_at,
        });
    }

    trends
}
