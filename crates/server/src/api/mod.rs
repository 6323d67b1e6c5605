//! HTTP routes.

mod error;
mod progress;
mod users;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use braingym_core::domain::ProgressService;
use serde_json::{Value, json};

pub use error::ApiError;

const BODY_LIMIT_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub progress: ProgressService,
}

impl AppState {
    pub fn new(progress: ProgressService) -> Self {
        Self { progress }
    }

    /// Run a store call on the blocking pool.
    async fn run<T, F>(&self, fallback: &'static str, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&ProgressService) -> braingym_core::Result<T> + Send + 'static,
    {
        let progress = self.progress.clone();
        tokio::task::spawn_blocking(move || f(&progress))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Blocking task failed");
                ApiError::bad_request(fallback)
            })?
            .map_err(|e| ApiError::from_core(e, fallback))
    }
}

/// Create all HTTP routes.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/users", post(users::register))
        .route("/api/progress/game-complete", post(progress::record_completion))
        .route("/api/progress/summary", get(progress::summary))
        .route(
            "/api/progress/goals",
            get(progress::goal_settings).post(progress::save_goal_setting),
        )
        .route("/api/progress/goal-progress", get(progress::goal_progress))
        .route("/api/progress/calendar", get(progress::calendar))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn not_found() -> ApiError {
    ApiError::not_found()
}
