//! Realtime audio streaming
//!
//! This module provides the `AudioStreamer` abstraction that manages:
//! - Audio capture through a `CaptureBackend`
//! - Low-latency PCM frame streaming to a realtime transcription socket
//! - Periodic batch upload of accumulated audio as WAV
//! - Finalized-utterance callbacks for incremental transcript text

mod config;
mod socket;
mod streamer;
mod upload;

pub use config::StreamerConfig;
pub use socket::{RealtimeConnection, RealtimeTranscriber, TranscriptEvent, WsTranscriber};
pub use streamer::{AudioStreamer, StreamerState};
pub use upload::{BatchUploader, HttpBatchUploader};
