use crate::http::response::internal_error;
use crate::repo::motor_logs;
use crate::state::AppState;
use axum::{Json, extract::State, response::IntoResponse};

/// GET /api/motor/current
pub async fn get_current(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.reconciler.snapshot().await)
}

/// POST /api/motor/save
///
/// Forces an immediate flush of the live snapshot, bypassing the debounce
/// and watchdog paths. Useful for testing and for operators who want a
/// row right now.
pub async fn post_save(State(state): State<AppState>) -> axum::response::Response {
    let snapshot = state.reconciler.snapshot().await;
    match motor_logs::insert_snapshot(&state.pool, &snapshot).await {
        Ok(_) => Json(serde_json::json!({
            "success": true,
            "message": "Data saved successfully",
            "currentState": snapshot,
        }))
        .into_response(),
        Err(e) => internal_error(e),
    }
}
