use std::path::PathBuf;
use thiserror::Error;

/// Errors that halt the recording-to-transcript pipeline.
///
/// Realtime socket and batch upload failures are deliberately absent: they
/// are non-fatal, logged where they occur, and never interrupt capture.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid session: no session matches join code '{0}'")]
    InvalidSession(String),

    #[error("no file uploaded")]
    NoFileUploaded,

    #[error("audio extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("transcript output missing at {}", .0.display())]
    TranscriptMissing(PathBuf),

    #[error("failed to persist transcript: {0}")]
    PublishFailed(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
