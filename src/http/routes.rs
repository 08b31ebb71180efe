use super::handlers;
use super::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Recording uploads carry whole meetings; allow up to 250 MB per request.
const MAX_UPLOAD_BYTES: usize = 250 * 1024 * 1024;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Sessions
        .route("/api/sessions", post(handlers::create_session))
        // Recording upload + pipeline
        .route("/api/recordings", post(handlers::upload_recording))
        .route("/api/recordings/:session_id", get(handlers::get_recording))
        // Periodic batch audio from the realtime streamer
        .route("/api/audio/batch", post(handlers::upload_batch_audio))
        // Transcript read/write
        .route("/api/transcripts", post(handlers::publish_transcript))
        .route(
            "/api/transcripts/:session_id",
            get(handlers::get_transcript),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        // The capture client is served from a different origin
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
