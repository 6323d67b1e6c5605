use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use braingym_core::domain::RegisterUserPayload;
use serde_json::{Value, json};

use super::{ApiError, AppState};

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterUserPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(payload) = payload?;
    let user = state
        .run("Unable to create account.", move |progress| {
            progress.register_user(&payload)
        })
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "user": user }))))
}
