use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use braingym_core::domain::{
    CalendarQuery, CompletionPayload, GoalProgressQuery, GoalSettingPayload, UserQuery,
};
use serde_json::{Value, json};

use super::{ApiError, AppState};

pub async fn record_completion(
    State(state): State<AppState>,
    payload: Result<Json<CompletionPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(payload) = payload?;
    let completion = state
        .run("Unable to save game completion.", move |progress| {
            progress.record_completion(&payload)
        })
        .await?;

    tracing::debug!(
        user_id = %completion.user_id,
        game_id = %completion.event.game_id,
        "Recorded game completion"
    );
    Ok((
        StatusCode::CREATED,
        Json(json!({ "ok": true, "completion": completion })),
    ))
}

pub async fn summary(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let summary = state
        .run("Unable to load progress summary.", move |progress| {
            progress.get_summary(&query)
        })
        .await?;

    Ok(Json(json!({ "ok": true, "summary": summary })))
}

pub async fn goal_settings(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let goals = state
        .run("Unable to load goals.", move |progress| {
            progress.get_goal_settings(&query)
        })
        .await?;

    Ok(Json(json!({ "ok": true, "goals": goals })))
}

pub async fn save_goal_setting(
    State(state): State<AppState>,
    payload: Result<Json<GoalSettingPayload>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(payload) = payload?;
    let goals = state
        .run("Unable to save goal.", move |progress| {
            progress.save_goal_setting(&payload)
        })
        .await?;

    Ok(Json(json!({ "ok": true, "goals": goals })))
}

pub async fn goal_progress(
    State(state): State<AppState>,
    query: Result<Query<GoalProgressQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let goal_progress = state
        .run("Unable to load goal progress.", move |progress| {
            progress.get_goal_progress(&query)
        })
        .await?;

    Ok(Json(json!({ "ok": true, "goalProgress": goal_progress })))
}

pub async fn calendar(
    State(state): State<AppState>,
    query: Result<Query<CalendarQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let calendar = state
        .run("Unable to load workout calendar.", move |progress| {
            progress.get_workout_calendar(&query)
        })
        .await?;

    Ok(Json(json!({ "ok": true, "calendar": calendar })))
}
