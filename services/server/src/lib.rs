pub mod config;
pub mod db;
pub mod feed;
pub mod flush;
pub mod http;
pub mod ingest;
pub mod repo;
pub mod state;

pub use state::AppState;

use axum::{
    Router,
    routing::{get, post},
};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/api/motor/current", get(http::motor::get_current))
        .route("/api/motor/save", post(http::motor::post_save))
        .route("/api/logs", get(http::logs::get_logs).post(http::logs::post_log))
        .route("/api/logs/latest", get(http::logs::get_latest))
        .with_state(state)
}

mod health {
    use axum::response::IntoResponse;
    pub async fn healthz() -> impl IntoResponse {
        "ok"
    }
}
