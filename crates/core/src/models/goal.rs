use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalPeriod {
    Week,
    Month,
    Year,
}

impl GoalPeriod {
    pub const ALL: [GoalPeriod; 3] = [GoalPeriod::Week, GoalPeriod::Month, GoalPeriod::Year];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    pub fn default_setting(&self) -> GoalSetting {
        match self {
            Self::Week => GoalSetting::new(5, 1),
            Self::Month => GoalSetting::new(20, 1),
            Self::Year => GoalSetting::new(240, 1),
        }
    }
}

impl fmt::Display for GoalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(Error::validation("Period must be week, month, or year.")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSetting {
    pub days: u32,
    pub times_per_day: u32,
    pub target_sessions: u32,
}

impl GoalSetting {
    pub fn new(days: u32, times_per_day: u32) -> Self {
        Self {
            days,
            times_per_day,
            target_sessions: days * times_per_day,
        }
    }
}

/// Goal settings for every period, defaults filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GoalSettings {
    pub week: GoalSetting,
    pub month: GoalSetting,
    pub year: GoalSetting,
}

impl Default for GoalSettings {
    fn default() -> Self {
        Self {
            week: GoalPeriod::Week.default_setting(),
            month: GoalPeriod::Month.default_setting(),
            year: GoalPeriod::Year.default_setting(),
        }
    }
}

impl GoalSettings {
    pub fn get(&self, period: GoalPeriod) -> GoalSetting {
        match period {
            GoalPeriod::Week => self.week,
            GoalPeriod::Month => self.month,
            GoalPeriod::Year => self.year,
        }
    }

    pub fn set(&mut self, period: GoalPeriod, setting: GoalSetting) {
        match period {
            GoalPeriod::Week => self.week = setting,
            GoalPeriod::Month => self.month = setting,
            GoalPeriod::Year => self.year = setting,
        }
    }
}

/// Attainment of a goal over the window `[start_date, end_date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub period: GoalPeriod,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub target_days: u32,
    pub times_per_day: u32,
    pub target_sessions: u32,
    pub achieved_days: u32,
    pub achieved_sessions: u32,
    pub days_percent: u32,
    pub sessions_percent: u32,
    pub overall_percent: u32,
}
