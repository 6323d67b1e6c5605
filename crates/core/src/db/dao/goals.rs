use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::params;

use crate::db::Database;
use crate::error::Result;
use crate::models::{GoalPeriod, GoalSetting, GoalSettings, UserId};
use crate::utils::time::format_timestamp;

#[derive(Clone)]
pub struct GoalsDao {
    db: Arc<Database>,
}

impl GoalsDao {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Saved settings, with defaults for any period the user never set.
    pub fn get_settings(&self, user_id: UserId) -> Result<GoalSettings> {
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT period, days, times_per_day FROM goal_settings WHERE user_id = ?1",
            )?;

            let rows = stmt
                .query_map(params![user_id], |row| {
                    Ok((
                        row.get::<_, GoalPeriod>(0)?,
                        GoalSetting::new(row.get(1)?, row.get(2)?),
                    ))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let mut settings = GoalSettings::default();
            for (period, setting) in rows {
                settings.set(period, setting);
            }

            Ok(settings)
        })
    }

    pub fn save_setting(
        &self,
        user_id: UserId,
        period: GoalPeriod,
        setting: GoalSetting,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.db.with_connection(|conn| {
            conn.execute(
                r#"
                INSERT INTO goal_settings (user_id, period, days, times_per_day, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(user_id, period) DO UPDATE SET
                    days = ?3,
                    times_per_day = ?4,
                    updated_at = ?5
                "#,
                params![
                    user_id,
                    period,
                    setting.days,
                    setting.times_per_day,
                    format_timestamp(&now)
                ],
            )?;
            Ok(())
        })
    }
}
