use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/history", get(handlers::history_page))
        .route("/mood", post(handlers::save_mood_form))
        .route("/api/today", get(handlers::get_today))
        .route("/api/entries", post(handlers::save_mood))
        .route("/api/history", get(handlers::get_history))
        .route("/api/insights", get(handlers::get_insights))
        .with_state(state)
}
