use std::sync::Arc;

use chrono::{Datelike, TimeZone, Utc};

use crate::aggregate;
use crate::db::{Database, EventFilter, EventsDao, ProgressSnapshot, UsersDao};
use crate::domain::GoalTracker;
use crate::domain::requests::{
    CalendarQuery, CompletionPayload, GoalProgressQuery, GoalSettingPayload, RegisterUserPayload,
    UserQuery, parse_period,
};
use crate::error::{Error, Result};
use crate::models::{
    GoalProgress, GoalSettings, ProgressSummary, StoredEvent, User, WorkoutCalendar,
};
use crate::utils::{Clock, SystemClock};

pub const RECENT_COMPLETIONS_LIMIT: u32 = 15;

/// Entry point for everything the game UIs and the progress page ask for.
#[derive(Clone)]
pub struct ProgressService {
    users: UsersDao,
    events: EventsDao,
    goals: GoalTracker,
    clock: Arc<dyn Clock>,
}

impl ProgressService {
    pub fn new(db: Arc<Database>) -> Self {
        Self::with_clock(db, Arc::new(SystemClock))
    }

    pub fn with_clock(db: Arc<Database>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users: UsersDao::new(db.clone()),
            events: EventsDao::new(db.clone()),
            goals: GoalTracker::new(db, clock.clone()),
            clock,
        }
    }

    /// Create a user that completions can be recorded against
    pub fn register_user(&self, payload: &RegisterUserPayload) -> Result<User> {
        let (email, name) = payload.validate()?;
        let user = self.users.create_user(&email, &name, self.clock.now())?;

        tracing::info!(user_id = %user.id, "Registered user");
        Ok(user)
    }

    /// Validate and store one game completion
    pub fn record_completion(&self, payload: &CompletionPayload) -> Result<StoredEvent> {
        let (lookup, event) = payload.validate()?;
        let user = self.users.resolve(&lookup)?;

        self.events.append(user.id, event, self.clock.now())
    }

    /// Stored rollup plus the views derived from the event history
    pub fn get_summary(&self, query: &UserQuery) -> Result<ProgressSummary> {
        let user = self.users.resolve(&query.lookup()?)?;
        let ProgressSnapshot {
            summary,
            history,
            recent,
        } = self.events.snapshot(user.id, RECENT_COMPLETIONS_LIMIT)?;

        Ok(ProgressSummary {
            user_id: user.id,
            email: user.email,
            name: user.name,
            sessions_played: summary.sessions_played,
            total_games_completed: summary.total_games_completed,
            total_score: summary.total_score,
            best_score: summary.best_score,
            total_workout_time_seconds: summary.total_workout_time_seconds,
            average_completion_seconds: summary.average_completion_seconds(),
            fastest_completion_seconds: summary.fastest_completion_seconds,
            last_played_at: summary.last_played_at,
            last_workout_completed_at: summary.last_workout_completed_at,
            game_stats: summary.game_stats_by_popularity(),
            score_trends: aggregate::score_trends(&history),
            recent_completions: recent,
            streak: aggregate::streak(&history, self.clock.now().date_naive()),
        })
    }

    pub fn get_goal_settings(&self, query: &UserQuery) -> Result<GoalSettings> {
        let user = self.users.resolve(&query.lookup()?)?;
        self.goals.get_settings(user.id)
    }

    pub fn save_goal_setting(&self, payload: &GoalSettingPayload) -> Result<GoalSettings> {
        let (lookup, period, days, times_per_day) = payload.validate()?;
        let user = self.users.resolve(&lookup)?;
        self.goals.save_setting(user.id, period, days, times_per_day)
    }

    pub fn get_goal_progress(&self, query: &GoalProgressQuery) -> Result<GoalProgress> {
        let lookup = query.user.lookup()?;
        let period = parse_period(query.period.as_deref())?;
        let user = self.users.resolve(&lookup)?;
        self.goals.get_progress(user.id, period)
    }

    /// Per-day completion counts for a year, the current one by default
    pub fn get_workout_calendar(&self, query: &CalendarQuery) -> Result<WorkoutCalendar> {
        let lookup = query.user.lookup()?;
        let year = query.year()?.unwrap_or_else(|| self.clock.now().year());
        let user = self.users.resolve(&lookup)?;

        let (start, end) = year_bounds(year)?;
        let events = self
            .events
            .list_events(user.id, &EventFilter::between(start, end))?;

        Ok(aggregate::calendar(&events, year))
    }
}

fn year_bounds(year: i32) -> Result<(chrono::DateTime<Utc>, chrono::DateTime<Utc>)> {
    let start = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single();
    let end = Utc.with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0).single();

    start
        .zip(end)
        .ok_or_else(|| Error::validation("Year is invalid."))
}
