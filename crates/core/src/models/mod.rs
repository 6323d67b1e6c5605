pub mod event;
pub mod goal;
pub mod summary;
pub mod user;
pub mod views;

pub use event::{GameCompletionEvent, StoredEvent};
pub use goal::{GoalPeriod, GoalProgress, GoalSetting, GoalSettings};
pub use summary::{GameplaySummary, PerGameStats};
pub use user::{User, UserId, UserLookup};
pub use views::{CalendarDay, ProgressSummary, ScoreTrend, Streak, TrendPoint, WorkoutCalendar};
