//! HTTP API server for the upload and transcript boundaries
//!
//! - POST /api/sessions - Create a session (join code)
//! - POST /api/recordings - Upload a recording, run the pipeline
//! - GET /api/recordings/:session_id - Fetch the stored recording
//! - POST /api/audio/batch - Periodic batch audio from the streamer
//! - POST /api/transcripts - Upsert a transcript directly
//! - GET /api/transcripts/:session_id - Fetch the stored transcript
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
