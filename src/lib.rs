pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod pipeline;
pub mod recorder;
pub mod store;
pub mod streamer;

pub use audio::{AudioBlock, CaptureBackend, ChannelBackend, WavFileBackend};
pub use config::Config;
pub use error::PipelineError;
pub use http::{create_router, AppState};
pub use pipeline::{
    AudioExtractor, FfmpegRunner, PipelineOutput, RecordingPipeline, ToolRunner,
    TranscriptPublisher, TranscriptionStage, WhisperRunner,
};
pub use recorder::{ChannelMediaBackend, MediaCaptureBackend, MediaChunk, SessionRecorder};
pub use store::{Recording, Session, SqliteStore, Transcript};
pub use streamer::{
    AudioStreamer, BatchUploader, HttpBatchUploader, RealtimeConnection, RealtimeTranscriber,
    StreamerConfig, StreamerState, TranscriptEvent, WsTranscriber,
};
