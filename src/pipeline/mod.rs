//! Recording processing pipeline
//!
//! This module provides the server-side chain that turns an uploaded
//! recording into a stored transcript:
//! - Ingestion: resolve the session, persist the artifact, upsert the
//!   Recording row
//! - Extraction: demux the recording into an audio-only file
//! - Transcription: run the speech-to-text engine and read its output
//! - Publishing: upsert the Transcript row

mod extract;
mod publish;
mod runner;
mod transcribe;

pub use extract::AudioExtractor;
pub use publish::TranscriptPublisher;
pub use runner::{FfmpegRunner, ToolRunner, WhisperRunner};
pub use transcribe::TranscriptionStage;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::PipelineError;
use crate::store::{Recording, SqliteStore, Transcript};

/// Everything the pipeline produced for one upload.
#[derive(Debug)]
pub struct PipelineOutput {
    pub recording: Recording,
    pub audio_path: PathBuf,
    pub transcript: Transcript,
}

/// Orchestrates ingestion and the extract → transcribe → publish chain.
///
/// Stages run strictly sequentially per recording; distinct recordings may
/// be processed concurrently because every derived path is keyed by the
/// upload's unique generated name.
pub struct RecordingPipeline {
    store: Arc<SqliteStore>,
    extractor: AudioExtractor,
    transcription: TranscriptionStage,
    publisher: TranscriptPublisher,
    upload_dir: PathBuf,
}

impl RecordingPipeline {
    pub fn new(
        store: Arc<SqliteStore>,
        extractor: AudioExtractor,
        transcription: TranscriptionStage,
        upload_dir: impl Into<PathBuf>,
    ) -> Self {
        let publisher = TranscriptPublisher::new(Arc::clone(&store));
        Self {
            store,
            extractor,
            transcription,
            publisher,
            upload_dir: upload_dir.into(),
        }
    }

    pub fn publisher(&self) -> &TranscriptPublisher {
        &self.publisher
    }

    /// Accept an uploaded recording artifact, associate it with the session
    /// identified by `join_code`, and run the processing chain through to a
    /// stored transcript.
    ///
    /// An unresolvable join code stops everything before any row is written.
    pub async fn ingest(
        &self,
        join_code: &str,
        original_name: &str,
        data: &[u8],
    ) -> Result<PipelineOutput, PipelineError> {
        let session = self
            .store
            .find_session_by_join_code(join_code)
            .await?
            .ok_or_else(|| PipelineError::InvalidSession(join_code.to_string()))?;

        let stored_path = self.save_upload(original_name, data).await?;
        let recording = self
            .store
            .upsert_recording(&session.id, &stored_path.to_string_lossy())
            .await?;

        info!(
            "Recording stored for session {}: {}",
            session.id,
            stored_path.display()
        );

        let (audio_path, transcript) = self.process(&session.id, &stored_path).await?;

        Ok(PipelineOutput {
            recording,
            audio_path,
            transcript,
        })
    }

    /// Run extraction → transcription → publish for an already-stored
    /// recording. Each stage verifies its output artifact before the next
    /// starts; any failure halts the chain for this recording.
    pub async fn process(
        &self,
        session_id: &str,
        recording_path: &Path,
    ) -> Result<(PathBuf, Transcript), PipelineError> {
        let audio_path = self.extractor.extract(recording_path).await?;
        let text = self.transcription.transcribe(&audio_path).await?;
        let transcript = self.publisher.publish(session_id, &text).await?;
        Ok((audio_path, transcript))
    }

    /// Persist the uploaded bytes under a generated unique name. The name
    /// keys every derived path, so concurrent pipelines never collide.
    async fn save_upload(
        &self,
        original_name: &str,
        data: &[u8],
    ) -> Result<PathBuf, PipelineError> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;

        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("webm");
        let filename = format!("{}.{}", Uuid::new_v4(), extension);
        let path = self.upload_dir.join(filename);

        tokio::fs::write(&path, data).await?;

        Ok(path)
    }
}
