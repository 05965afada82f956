pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::admin::handlers as admin;
use crate::interview::handlers as interview;
use crate::report::handlers as report;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Candidate interview
        .route("/api/v1/interviews", post(interview::handle_start))
        .route("/api/v1/interviews/current", get(interview::handle_current))
        .route(
            "/api/v1/interviews/current/answers",
            post(interview::handle_answer),
        )
        .route(
            "/api/v1/interviews/current/finish",
            post(interview::handle_finish),
        )
        // Admin
        .route("/api/v1/admin/login", post(admin::handle_login))
        .route("/api/v1/admin/logout", post(admin::handle_logout))
        .route(
            "/api/v1/admin/credentials",
            put(admin::handle_upsert_credentials),
        )
        .route("/api/v1/admin/reports", get(report::handle_list_reports))
        .route("/api/v1/admin/reports/:id", get(report::handle_get_report))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
