pub mod goals;
pub mod progress;
pub mod requests;

pub use goals::GoalTracker;
pub use progress::ProgressService;
pub use requests::{
    CalendarQuery, CompletionPayload, GoalProgressQuery, GoalSettingPayload, RegisterUserPayload,
    UserQuery,
};
