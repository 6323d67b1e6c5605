use std::sync::Arc;

use crate::aggregate;
use crate::db::{Database, EventFilter, EventsDao, GoalsDao};
use crate::error::{Error, Result};
use crate::models::{GoalPeriod, GoalProgress, GoalSetting, GoalSettings, UserId};
use crate::utils::Clock;
use crate::utils::time::{max_days_for_period, period_window};

pub const MAX_TIMES_PER_DAY: u32 = 10;

#[derive(Clone)]
pub struct GoalTracker {
    goals: GoalsDao,
    events: EventsDao,
    clock: Arc<dyn Clock>,
}

impl GoalTracker {
    pub fn new(db: Arc<Database>, clock: Arc<dyn Clock>) -> Self {
        Self {
            goals: GoalsDao::new(db.clone()),
            events: EventsDao::new(db),
            clock,
        }
    }

    /// Get goal settings for every period
    pub fn get_settings(&self, user_id: UserId) -> Result<GoalSettings> {
        self.goals.get_settings(user_id)
    }

    /// Validate and save one period's goal, returning all settings
    pub fn save_setting(
        &self,
        user_id: UserId,
        period: GoalPeriod,
        days: u32,
        times_per_day: u32,
    ) -> Result<GoalSettings> {
        let now = self.clock.now();
        let max_days = max_days_for_period(period, self.clock.now_local().date_naive());

        if !(1..=max_days).contains(&days) {
            return Err(Error::validation(format!(
                "Days must be between 1 and {} for a {} goal.",
                max_days, period
            )));
        }
        if !(1..=MAX_TIMES_PER_DAY).contains(&times_per_day) {
            return Err(Error::validation(format!(
                "Times per day must be between 1 and {}.",
                MAX_TIMES_PER_DAY
            )));
        }

        self.goals
            .save_setting(user_id, period, GoalSetting::new(days, times_per_day), now)?;
        tracing::debug!(%user_id, %period, days, times_per_day, "Saved goal setting");

        self.goals.get_settings(user_id)
    }

    /// Attainment for the period that contains "now"
    pub fn get_progress(&self, user_id: UserId, period: GoalPeriod) -> Result<GoalProgress> {
        let now = self.clock.now_local();
        let window = period_window(period, &now);
        let setting = self.goals.get_settings(user_id)?.get(period);
        let events = self
            .events
            .list_events(user_id, &EventFilter::between(window.0, window.1))?;

        Ok(aggregate::goal_progress(
            period,
            setting,
            window,
            &events,
            &now.timezone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone, Utc};

    use super::*;
    use crate::db::{UsersDao, open_in_memory};
    use crate::utils::FixedClock;

    fn tracker_in_february() -> (GoalTracker, UserId) {
        let now = Local
            .with_ymd_and_hms(2024, 2, 14, 12, 0, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        let db = open_in_memory().unwrap();
        let user = UsersDao::new(db.clone())
            .create_user("feb@example.com", "Feb", now)
            .unwrap();

        (GoalTracker::new(db, Arc::new(FixedClock::new(now))), user.id)
    }

    #[test]
    fn test_month_limit_follows_current_month() {
        let (tracker, user_id) = tracker_in_february();

        let settings = tracker.save_setting(user_id, GoalPeriod::Month, 29, 1).unwrap();
        assert_eq!(settings.month.days, 29);

        let err = tracker
            .save_setting(user_id, GoalPeriod::Month, 30, 1)
            .unwrap_err();
        assert_eq!(err.to_string(), "Days must be between 1 and 29 for a month goal.");
    }

    #[test]
    fn test_year_limit_and_times_per_day() {
        let (tracker, user_id) = tracker_in_february();

        assert!(tracker.save_setting(user_id, GoalPeriod::Year, 366, 10).is_ok());
        assert!(tracker.save_setting(user_id, GoalPeriod::Year, 367, 1).is_err());

        let err = tracker
            .save_setting(user_id, GoalPeriod::Week, 3, 11)
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().starts_with("Times per day"));
    }

    #[test]
    fn test_progress_with_no_events_uses_defaults() {
        let (tracker, user_id) = tracker_in_february();

        let progress = tracker.get_progress(user_id, GoalPeriod::Year).unwrap();
        assert_eq!(progress.target_days, 240);
        assert_eq!(progress.achieved_days, 0);
        assert_eq!(progress.overall_percent, 0);
        assert!(progress.start_date < progress.end_date);
    }
}
