use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use super::runner::ToolRunner;
use crate::error::PipelineError;

/// Derives an audio-only file from a combined audio/video recording.
pub struct AudioExtractor {
    runner: Arc<dyn ToolRunner>,
    output_dir: PathBuf,
}

impl AudioExtractor {
    pub fn new(runner: Arc<dyn ToolRunner>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            output_dir: output_dir.into(),
        }
    }

    /// Run the transcoder against `recording`. Succeeds only if the process
    /// exits cleanly and the derived audio file exists; otherwise the
    /// pipeline halts with `ExtractionFailed` and no later stage sees a
    /// partial artifact.
    pub async fn extract(&self, recording: &Path) -> Result<PathBuf, PipelineError> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let audio_path = self
            .runner
            .run(recording, &self.output_dir)
            .await
            .map_err(|e| PipelineError::ExtractionFailed(format!("{:#}", e)))?;

        if !audio_path.exists() {
            return Err(PipelineError::ExtractionFailed(format!(
                "no audio produced at {}",
                audio_path.display()
            )));
        }

        info!("Audio extracted: {}", audio_path.display());

        Ok(audio_path)
    }
}
