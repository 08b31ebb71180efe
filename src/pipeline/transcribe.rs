use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use super::runner::ToolRunner;
use crate::error::PipelineError;

/// Runs the speech-to-text engine against an extracted audio file and reads
/// back the produced transcript text.
pub struct TranscriptionStage {
    runner: Arc<dyn ToolRunner>,
    output_dir: PathBuf,
}

impl TranscriptionStage {
    pub fn new(runner: Arc<dyn ToolRunner>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            output_dir: output_dir.into(),
        }
    }

    pub async fn transcribe(&self, audio: &Path) -> Result<String, PipelineError> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let transcript_path = self
            .runner
            .run(audio, &self.output_dir)
            .await
            .map_err(|e| PipelineError::TranscriptionFailed(format!("{:#}", e)))?;

        // A clean exit is not enough: the engine may have written its output
        // under a different naming convention.
        if !transcript_path.exists() {
            return Err(PipelineError::TranscriptMissing(transcript_path));
        }

        let text = tokio::fs::read_to_string(&transcript_path).await?;

        info!(
            "Transcript read: {} chars from {}",
            text.len(),
            transcript_path.display()
        );

        Ok(text)
    }
}
