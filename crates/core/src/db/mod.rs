pub mod cache;
pub mod connection;
pub mod dao;
pub mod migrations;
mod sql_types;

pub use cache::{open_database, open_in_memory};
pub use connection::Database;
pub use dao::{EventFilter, EventsDao, GoalsDao, ProgressSnapshot, UsersDao};
