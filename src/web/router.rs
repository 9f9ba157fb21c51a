//! Axum router — maps URL paths to handlers.

use crate::config::Variant;
use crate::web::handlers::{
    admin_reload, api_models, api_predict, api_stats, health, hello, predict_form,
    predict_submit, submit, welcome,
};
use crate::web::state::{AppState, SharedState};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the router; `/` depends on the configured variant.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    let home = match shared.config.server.variant {
        Variant::Welcome => get(welcome),
        Variant::Predict => get(predict_form).post(predict_submit),
    };

    Router::new()
        // Pages
        .route("/", home)
        .route("/hello/{name}", get(hello).post(hello))
        .route("/submit", post(submit))
        .route("/health", get(health))

        // API endpoints
        .route("/api/predict", post(api_predict))
        .route("/api/stats/{sex}", get(api_stats))
        .route("/api/models", get(api_models))
        .route("/admin/reload", post(admin_reload))

        // Middleware
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
