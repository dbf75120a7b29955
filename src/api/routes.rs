//! API route definitions

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::api::handlers;
use crate::AppState;

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let max_upload_bytes = state.settings.server.max_upload_bytes;
    let static_dir = state.settings.server.static_dir.clone();

    let router = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/session", get(handlers::get_session))
        .route("/api/session/upload", post(handlers::upload))
        .route("/api/session/generate", post(handlers::generate))
        .route("/api/session/reset", post(handlers::reset))
        .route("/api/session/download", get(handlers::download))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}
