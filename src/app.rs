use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/habits", get(handlers::list_habits).post(handlers::create_habit))
        .route("/api/habits/:id/complete", post(handlers::complete_habit))
        .route("/api/moods", get(handlers::list_moods).post(handlers::create_mood))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/encouragement", get(handlers::get_encouragement))
        .route("/api/meta", get(handlers::get_meta))
        .with_state(state)
}
