pub mod events;
pub mod goals;
pub mod users;

pub use events::{EventFilter, EventsDao, ProgressSnapshot};
pub use goals::GoalsDao;
pub use users::UsersDao;
