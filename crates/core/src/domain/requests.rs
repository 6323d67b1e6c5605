//! Loosely-typed inputs as clients send them, and the rules that turn them
//! into validated domain values.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::event::DEFAULT_SCORE_UNIT;
use crate::models::{GameCompletionEvent, GoalPeriod, UserLookup};
use crate::utils::time::parse_timestamp;

/// Largest score or duration accepted from a client. Keeps running totals far
/// from `i64::MAX`.
pub const MAX_RECORDED_VALUE: i64 = i64::MAX >> 20;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Option<String>,
    pub email: Option<String>,
}

impl UserQuery {
    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            user_id: None,
            email: Some(email.into()),
        }
    }

    pub fn lookup(&self) -> Result<UserLookup> {
        UserLookup::from_parts(self.user_id.as_deref(), self.email.as_deref())
            .ok_or_else(|| Error::validation("User information is required."))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterUserPayload {
    pub email: Option<String>,
    pub name: Option<String>,
}

impl RegisterUserPayload {
    /// Normalized `(email, name)`.
    pub fn validate(&self) -> Result<(String, String)> {
        let email = self
            .email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .unwrap_or_default();
        let name = self.name.as_deref().map(str::trim).unwrap_or_default();

        if email.is_empty() || !email.contains('@') {
            return Err(Error::validation("A valid email is required."));
        }
        if name.is_empty() {
            return Err(Error::validation("Name is required."));
        }

        Ok((email, name.to_string()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionPayload {
    #[serde(flatten)]
    pub user: UserQuery,
    pub session_id: Option<String>,
    pub game_id: Option<String>,
    pub game_name: Option<String>,
    pub stage: Option<f64>,
    pub total_stages: Option<f64>,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub duration_seconds: Option<f64>,
    pub score: Option<f64>,
    pub score_unit: Option<String>,
}

impl CompletionPayload {
    /// Check every field, stopping at the first violation.
    pub fn validate(&self) -> Result<(UserLookup, GameCompletionEvent)> {
        let lookup = self.user.lookup()?;

        let game_id = trimmed(&self.game_id);
        let game_name = trimmed(&self.game_name);
        if game_id.is_empty() || game_name.is_empty() {
            return Err(Error::validation("Game information is required."));
        }

        let started_at = parse_timestamp(self.started_at.as_deref(), "Start time")?;
        let completed_at = parse_timestamp(self.completed_at.as_deref(), "Completion time")?;
        if completed_at <= started_at {
            return Err(Error::validation(
                "Completion time must be after start time.",
            ));
        }

        let stage = parse_positive_int(self.stage, "Stage")?;
        let total_stages = parse_positive_int(self.total_stages, "Total stages")?;
        if stage > total_stages {
            return Err(Error::validation(
                "Stage cannot be greater than total stages.",
            ));
        }

        let elapsed = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;
        let duration = match self.duration_seconds {
            Some(d) if d.is_finite() && d > 0.0 => d,
            _ => elapsed,
        };
        if duration.round() > MAX_RECORDED_VALUE as f64 {
            return Err(Error::validation("Duration is too large."));
        }
        let score = parse_score(self.score)?;

        let score_unit = match trimmed(&self.score_unit) {
            "" => DEFAULT_SCORE_UNIT,
            unit => unit,
        };
        let session_id = Some(trimmed(&self.session_id))
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let event = GameCompletionEvent {
            game_id: game_id.to_string(),
            game_name: game_name.to_string(),
            score,
            score_unit: score_unit.to_string(),
            duration_seconds: (duration.round() as i64).max(1),
            started_at,
            completed_at,
            session_id,
            stage,
            total_stages,
        };

        Ok((lookup, event))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSettingPayload {
    #[serde(flatten)]
    pub user: UserQuery,
    pub period: Option<String>,
    pub days: Option<f64>,
    pub times_per_day: Option<f64>,
}

impl GoalSettingPayload {
    /// Shape checks only; range checks against the period happen in the
    /// goal tracker, which knows today's date.
    pub fn validate(&self) -> Result<(UserLookup, GoalPeriod, u32, u32)> {
        let lookup = self.user.lookup()?;
        let period = parse_period(self.period.as_deref())?;
        let days = parse_positive_int(self.days, "Days")?;
        let times_per_day = parse_positive_int(self.times_per_day, "Times per day")?;

        Ok((lookup, period, days, times_per_day))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoalProgressQuery {
    #[serde(flatten)]
    pub user: UserQuery,
    pub period: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarQuery {
    #[serde(flatten)]
    pub user: UserQuery,
    pub year: Option<String>,
}

impl CalendarQuery {
    /// The requested year, if one was given.
    pub fn year(&self) -> Result<Option<i32>> {
        match self.year.as_deref().map(str::trim).filter(|y| !y.is_empty()) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<i32>()
                .ok()
                .filter(|y| (1970..=9999).contains(y))
                .map(Some)
                .ok_or_else(|| Error::validation("Year is invalid.")),
        }
    }
}

/// Missing periods mean "week".
pub fn parse_period(input: Option<&str>) -> Result<GoalPeriod> {
    match input.map(str::trim).filter(|p| !p.is_empty()) {
        Some(raw) => raw.parse(),
        None => Ok(GoalPeriod::Week),
    }
}

fn parse_positive_int(input: Option<f64>, label: &str) -> Result<u32> {
    match input {
        Some(v) if v.is_finite() && v.fract() == 0.0 && v >= 1.0 && v <= u32::MAX as f64 => {
            Ok(v as u32)
        }
        _ => Err(Error::validation(format!(
            "{} must be a positive number.",
            label
        ))),
    }
}

/// Scores are whole and never negative; garbage counts as zero.
fn parse_score(input: Option<f64>) -> Result<i64> {
    match input {
        Some(v) if v.is_finite() => {
            let rounded = v.round();
            if rounded > MAX_RECORDED_VALUE as f64 {
                return Err(Error::validation("Score is too large."));
            }
            Ok((rounded as i64).max(0))
        }
        _ => Ok(0),
    }
}

fn trimmed(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> CompletionPayload {
        CompletionPayload {
            user: UserQuery::by_email("Player@Example.com"),
            session_id: Some("abc".into()),
            game_id: Some("memory-game".into()),
            game_name: Some("Memory Game".into()),
            stage: Some(1.0),
            total_stages: Some(3.0),
            started_at: Some("2024-05-01T10:00:00Z".into()),
            completed_at: Some("2024-05-01T10:01:30Z".into()),
            duration_seconds: None,
            score: Some(12.0),
            score_unit: None,
        }
    }

    fn message(p: &CompletionPayload) -> String {
        p.validate().unwrap_err().to_string()
    }

    #[test]
    fn test_valid_payload() {
        let (lookup, event) = payload().validate().unwrap();

        assert_eq!(lookup, UserLookup::Email("player@example.com".into()));
        assert_eq!(event.duration_seconds, 90);
        assert_eq!(event.score_unit, "points");
        assert_eq!(event.session_id.as_deref(), Some("abc"));
        assert!(!event.completes_session());
    }

    #[test]
    fn test_first_violation_is_reported() {
        let mut p = payload();
        p.user = UserQuery::default();
        p.game_id = None;
        assert_eq!(message(&p), "User information is required.");

        let mut p = payload();
        p.game_name = Some("   ".into());
        p.started_at = Some("nope".into());
        assert_eq!(message(&p), "Game information is required.");

        let mut p = payload();
        p.started_at = Some("nope".into());
        assert_eq!(message(&p), "Start time is invalid.");

        let mut p = payload();
        p.completed_at = None;
        assert_eq!(message(&p), "Completion time is invalid.");

        let mut p = payload();
        p.completed_at = p.started_at.clone();
        assert_eq!(message(&p), "Completion time must be after start time.");

        let mut p = payload();
        p.stage = Some(0.0);
        assert_eq!(message(&p), "Stage must be a positive number.");

        let mut p = payload();
        p.total_stages = Some(2.5);
        assert_eq!(message(&p), "Total stages must be a positive number.");

        let mut p = payload();
        p.stage = Some(4.0);
        assert_eq!(message(&p), "Stage cannot be greater than total stages.");
        assert!(p.validate().unwrap_err().is_validation());
    }

    #[test]
    fn test_duration_defaults_and_rounding() {
        let mut p = payload();
        p.duration_seconds = Some(-5.0);
        assert_eq!(p.validate().unwrap().1.duration_seconds, 90);

        p.duration_seconds = Some(12.6);
        assert_eq!(p.validate().unwrap().1.duration_seconds, 13);

        p.duration_seconds = Some(0.2);
        assert_eq!(p.validate().unwrap().1.duration_seconds, 1);

        p.duration_seconds = None;
        p.completed_at = Some("2024-05-01T10:00:00.300Z".into());
        assert_eq!(p.validate().unwrap().1.duration_seconds, 1);
    }

    #[test]
    fn test_score_normalization() {
        let mut p = payload();
        p.score = Some(-3.0);
        assert_eq!(p.validate().unwrap().1.score, 0);

        p.score = Some(7.5);
        assert_eq!(p.validate().unwrap().1.score, 8);

        p.score = None;
        assert_eq!(p.validate().unwrap().1.score, 0);

        p.score = Some(f64::NAN);
        assert_eq!(p.validate().unwrap().1.score, 0);
    }

    #[test]
    fn test_oversized_score_and_duration_are_rejected() {
        let mut p = payload();
        p.score = Some(1e19);
        assert_eq!(message(&p), "Score is too large.");

        p.score = Some(MAX_RECORDED_VALUE as f64 / 2.0);
        assert!(p.validate().is_ok());

        let mut p = payload();
        p.duration_seconds = Some(1e19);
        assert_eq!(message(&p), "Duration is too large.");
    }

    #[test]
    fn test_payload_deserializes_camel_case() {
        let json = serde_json::json!({
            "userId": "6e4c5a1e-93c5-4df3-9bbd-53c4d5bc1a2e",
            "gameId": "math-challenge",
            "gameName": "Math Challenge",
            "stage": 2,
            "totalStages": 2,
            "startedAt": "2024-05-01T10:00:00Z",
            "completedAt": "2024-05-01T10:00:40Z",
            "durationSeconds": 38,
            "score": 9,
            "scoreUnit": "correct"
        });

        let payload: CompletionPayload = serde_json::from_value(json).unwrap();
        let (lookup, event) = payload.validate().unwrap();

        assert!(lookup.id().is_some());
        assert_eq!(event.duration_seconds, 38);
        assert_eq!(event.score_unit, "correct");
        assert!(event.completes_session());
    }

    #[test]
    fn test_goal_payload() {
        let p = GoalSettingPayload {
            user: UserQuery::by_email("a@b.c"),
            period: Some("Month".into()),
            days: Some(12.0),
            times_per_day: Some(2.0),
        };
        let (_, period, days, times) = p.validate().unwrap();
        assert_eq!((period, days, times), (GoalPeriod::Month, 12, 2));

        let p = GoalSettingPayload {
            times_per_day: None,
            ..p
        };
        assert_eq!(
            p.validate().unwrap_err().to_string(),
            "Times per day must be a positive number."
        );
    }

    #[test]
    fn test_period_and_year_parsing() {
        assert_eq!(parse_period(None).unwrap(), GoalPeriod::Week);
        assert_eq!(parse_period(Some(" ")).unwrap(), GoalPeriod::Week);
        assert!(parse_period(Some("fortnight")).is_err());

        let q = CalendarQuery {
            user: UserQuery::default(),
            year: Some("2024".into()),
        };
        assert_eq!(q.year().unwrap(), Some(2024));

        let q = CalendarQuery {
            year: Some("twenty".into()),
            ..q
        };
        assert_eq!(q.year().unwrap_err().to_string(), "Year is invalid.");
    }
}
