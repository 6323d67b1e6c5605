//! Brain Gym progress tracking.
//!
//! Records game completion events per user and derives progress rollups
//! from them: totals, per-game statistics, score trends, a yearly activity
//! calendar, streaks and goal attainment.

pub mod aggregate;
pub mod db;
pub mod domain;
pub mod error;
pub mod models;
pub mod utils;

pub use error::{Error, ErrorKind, Result};
