use crate::pipeline::RecordingPipeline;
use crate::store::SqliteStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SqliteStore>,
    pub pipeline: Arc<RecordingPipeline>,
    /// Where periodic batch audio blobs are written
    pub batch_dir: PathBuf,
}
