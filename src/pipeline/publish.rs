use std::sync::Arc;
use tracing::info;

use crate::error::PipelineError;
use crate::store::{SqliteStore, Transcript};

/// Persists transcript text against its session.
///
/// Terminal step of the pipeline, and directly invocable for idempotent
/// re-publish (a retried pipeline or a manually resupplied transcript).
pub struct TranscriptPublisher {
    store: Arc<SqliteStore>,
}

impl TranscriptPublisher {
    pub fn new(store: Arc<SqliteStore>) -> Self {
        Self { store }
    }

    pub async fn publish(&self, session_id: &str, text: &str) -> Result<Transcript, PipelineError> {
        let transcript = self
            .store
            .upsert_transcript(session_id, text)
            .await
            .map_err(|e| PipelineError::PublishFailed(e.to_string()))?;

        info!(
            "Transcript published for session {}: {} chars",
            session_id,
            text.len()
        );

        Ok(transcript)
    }
}
