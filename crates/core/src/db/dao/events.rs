use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use uuid::Uuid;

use crate::aggregate;
use crate::db::Database;
use crate::db::sql_types::{optional_timestamp_column, timestamp_column};
use crate::error::Result;
use crate::models::{GameCompletionEvent, GameplaySummary, PerGameStats, StoredEvent, UserId};
use crate::utils::time::format_timestamp;

const EVENT_COLUMNS: &str = r#"
    id, event_id, user_id, game_id, game_name, score, score_unit, duration_seconds,
    started_at, completed_at, session_id, stage, total_stages, created_at
"#;

/// Narrows [`EventsDao::list_events`]. The default matches every event.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl EventFilter {
    /// Events completed in `[from, until)`.
    pub fn between(from: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            until: Some(until),
        }
    }
}

/// Everything the progress page needs, read under one lock so the pieces
/// agree with each other.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub summary: GameplaySummary,
    pub history: Vec<StoredEvent>,
    pub recent: Vec<StoredEvent>,
}

#[derive(Clone)]
pub struct EventsDao {
    db: Arc<Database>,
}

impl EventsDao {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store an event and fold it into the user's summary.
    ///
    /// Both writes happen in one immediate transaction: concurrent appends for
    /// the same user serialize, and a failure leaves neither write behind.
    pub fn append(
        &self,
        user_id: UserId,
        event: GameCompletionEvent,
        now: DateTime<Utc>,
    ) -> Result<StoredEvent> {
        self.db.transaction(|tx| {
            let summary = load_summary(tx, user_id)?;
            let summary = aggregate::apply_event(summary, &event);
            save_summary(tx, user_id, &summary, &event.game_id, now)?;

            let event_id = Uuid::new_v4().to_string();
            tx.execute(
                r#"
                INSERT INTO game_progress_events
                    (event_id, user_id, game_id, game_name, score, score_unit,
                     duration_seconds, started_at, completed_at, session_id, stage,
                     total_stages, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                "#,
                params![
                    &event_id,
                    user_id,
                    &event.game_id,
                    &event.game_name,
                    event.score,
                    &event.score_unit,
                    event.duration_seconds,
                    format_timestamp(&event.started_at),
                    format_timestamp(&event.completed_at),
                    &event.session_id,
                    event.stage,
                    event.total_stages,
                    format_timestamp(&now),
                ],
            )?;
            let seq = tx.last_insert_rowid();

            tracing::debug!(
                %user_id,
                %event_id,
                game_id = %event.game_id,
                stage = event.stage,
                total_stages = event.total_stages,
                "Recorded game completion"
            );

            Ok(StoredEvent {
                event_id,
                seq,
                user_id,
                event,
                created_at: now,
            })
        })
    }

    pub fn get_summary(&self, user_id: UserId) -> Result<GameplaySummary> {
        self.db.with_connection(|conn| load_summary(conn, user_id))
    }

    /// Events oldest first; ties on completion time keep insertion order.
    pub fn list_events(&self, user_id: UserId, filter: &EventFilter) -> Result<Vec<StoredEvent>> {
        self.db
            .with_connection(|conn| query_events(conn, user_id, filter))
    }

    /// Summary, full history and the newest `recent_limit` events (newest
    /// first) as of one instant.
    pub fn snapshot(&self, user_id: UserId, recent_limit: u32) -> Result<ProgressSnapshot> {
        self.db.with_connection(|conn| {
            Ok(ProgressSnapshot {
                summary: load_summary(conn, user_id)?,
                history: query_events(conn, user_id, &EventFilter::default())?,
                recent: query_recent(conn, user_id, recent_limit)?,
            })
        })
    }
}

fn query_events(
    conn: &Connection,
    user_id: UserId,
    filter: &EventFilter,
) -> Result<Vec<StoredEvent>> {
    let mut sql = format!(
        "SELECT {} FROM game_progress_events WHERE user_id = ?1",
        EVENT_COLUMNS
    );
    let mut values: Vec<Value> = vec![Value::Text(user_id.to_string())];

    if let Some(from) = &filter.from {
        values.push(Value::Text(format_timestamp(from)));
        sql.push_str(&format!(" AND completed_at >= ?{}", values.len()));
    }
    if let Some(until) = &filter.until {
        values.push(Value::Text(format_timestamp(until)));
        sql.push_str(&format!(" AND completed_at < ?{}", values.len()));
    }
    sql.push_str(" ORDER BY completed_at ASC, id ASC");

    let mut stmt = conn.prepare(&sql)?;
    let events = stmt
        .query_map(params_from_iter(values.iter()), map_event)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(events)
}

fn query_recent(conn: &Connection, user_id: UserId, limit: u32) -> Result<Vec<StoredEvent>> {
    let mut stmt = conn.prepare(&format!(
        r#"
        SELECT {}
        FROM game_progress_events
        WHERE user_id = ?1
        ORDER BY completed_at DESC, id DESC
        LIMIT ?2
        "#,
        EVENT_COLUMNS
    ))?;

    let events = stmt
        .query_map(params![user_id, limit], map_event)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(events)
}

fn load_summary(conn: &Connection, user_id: UserId) -> Result<GameplaySummary> {
    let summary = conn
        .query_row(
            r#"
            SELECT
                total_games_completed, total_score, best_score,
                total_workout_time_seconds, fastest_completion_seconds,
                sessions_played, last_played_at, last_workout_completed_at
            FROM gameplay_summary
            WHERE user_id = ?1
            "#,
            params![user_id],
            |row| {
                Ok(GameplaySummary {
                    total_games_completed: row.get(0)?,
                    total_score: row.get(1)?,
                    best_score: row.get(2)?,
                    total_workout_time_seconds: row.get(3)?,
                    fastest_completion_seconds: row.get(4)?,
                    sessions_played: row.get(5)?,
                    last_played_at: optional_timestamp_column(row, 6)?,
                    last_workout_completed_at: optional_timestamp_column(row, 7)?,
                    game_stats: BTreeMap::new(),
                })
            },
        )
        .optional()?;

    let Some(mut summary) = summary else {
        return Ok(GameplaySummary::default());
    };

    let mut stmt = conn.prepare(
        r#"
        SELECT
            game_id, game_name, score_unit, times_played, total_score, best_score,
            average_score, total_time_seconds, best_time_seconds, last_score,
            last_duration_seconds, last_played_at
        FROM game_stats
        WHERE user_id = ?1
        "#,
    )?;

    let stats = stmt
        .query_map(params![user_id], |row| {
            Ok(PerGameStats {
                game_id: row.get(0)?,
                game_name: row.get(1)?,
                score_unit: row.get(2)?,
                times_played: row.get(3)?,
                total_score: row.get(4)?,
                best_score: row.get(5)?,
                average_score: row.get(6)?,
                total_time_seconds: row.get(7)?,
                best_time_seconds: row.get(8)?,
                last_score: row.get(9)?,
                last_duration_seconds: row.get(10)?,
                last_played_at: timestamp_column(row, 11)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    summary.game_stats = stats
        .into_iter()
        .map(|s| (s.game_id.clone(), s))
        .collect();

    Ok(summary)
}

/// Persist the summary scalars and the per-game row for `game_id`; other
/// games' rows are untouched by a single append.
fn save_summary(
    conn: &Connection,
    user_id: UserId,
    summary: &GameplaySummary,
    game_id: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO gameplay_summary
            (user_id, total_games_completed, total_score, best_score,
             total_workout_time_seconds, fastest_completion_seconds, sessions_played,
             last_played_at, last_workout_completed_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        ON CONFLICT(user_id) DO UPDATE SET
            total_games_completed = ?2,
            total_score = ?3,
            best_score = ?4,
            total_workout_time_seconds = ?5,
            fastest_completion_seconds = ?6,
            sessions_played = ?7,
            last_played_at = ?8,
            last_workout_completed_at = ?9,
            updated_at = ?10
        "#,
        params![
            user_id,
            summary.total_games_completed,
            summary.total_score,
            summary.best_score,
            summary.total_workout_time_seconds,
            summary.fastest_completion_seconds,
            summary.sessions_played,
            summary.last_played_at.as_ref().map(format_timestamp),
            summary.last_workout_completed_at.as_ref().map(format_timestamp),
            format_timestamp(&now),
        ],
    )?;

    if let Some(stats) = summary.game_stats.get(game_id) {
        conn.execute(
            r#"
            INSERT INTO game_stats
                (user_id, game_id, game_name, score_unit, times_played, total_score,
                 best_score, average_score, total_time_seconds, best_time_seconds,
                 last_score, last_duration_seconds, last_played_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ON CONFLICT(user_id, game_id) DO UPDATE SET
                game_name = ?3,
                score_unit = ?4,
                times_played = ?5,
                total_score = ?6,
                best_score = ?7,
                average_score = ?8,
                total_time_seconds = ?9,
                best_time_seconds = ?10,
                last_score = ?11,
                last_duration_seconds = ?12,
                last_played_at = ?13
            "#,
            params![
                user_id,
                &stats.game_id,
                &stats.game_name,
                &stats.score_unit,
                stats.times_played,
                stats.total_score,
                stats.best_score,
                stats.average_score,
                stats.total_time_seconds,
                stats.best_time_seconds,
                stats.last_score,
                stats.last_duration_seconds,
                format_timestamp(&stats.last_played_at),
            ],
        )?;
    }

    Ok(())
}

fn map_event(row: &Row<'_>) -> rusqlite::Result<StoredEvent> {
    Ok(StoredEvent {
        seq: row.get(0)?,
        event_id: row.get(1)?,
        user_id: row.get(2)?,
        event: GameCompletionEvent {
            game_id: row.get(3)?,
            game_name: row.get(4)?,
            score: row.get(5)?,
            score_unit: row.get(6)?,
            duration_seconds: row.get(7)?,
            started_at: timestamp_column(row, 8)?,
            completed_at: timestamp_column(row, 9)?,
            session_id: row.get(10)?,
            stage: row.get(11)?,
            total_stages: row.get(12)?,
        },
        created_at: timestamp_column(row, 13)?,
    })
}
