use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::config::StreamerConfig;
use super::socket::{RealtimeConnection, RealtimeTranscriber};
use super::upload::BatchUploader;
use crate::audio::{encode, AudioBlock, CaptureBackend};

/// Lifecycle of an `AudioStreamer`. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamerState {
    Idle,
    Capturing,
    Closed,
}

/// Streams captured audio to a realtime transcription socket while
/// accumulating samples for periodic batch upload.
///
/// Each instance owns its socket, timer, and accumulation buffer, so multiple
/// sessions can stream from the same process without cross-talk. Block
/// handling and the upload ticker share a single task: snapshotting and
/// clearing the accumulation buffer is atomic with respect to their
/// interleaving.
pub struct AudioStreamer {
    config: StreamerConfig,
    transcriber: Arc<dyn RealtimeTranscriber>,
    uploader: Arc<dyn BatchUploader>,
    state: StreamerState,
    capture_task: Option<JoinHandle<()>>,
    event_task: Option<JoinHandle<()>>,
    stop_tx: Option<watch::Sender<bool>>,
}

impl AudioStreamer {
    pub fn new(
        config: StreamerConfig,
        transcriber: Arc<dyn RealtimeTranscriber>,
        uploader: Arc<dyn BatchUploader>,
    ) -> Self {
        Self {
            config,
            transcriber,
            uploader,
            state: StreamerState::Idle,
            capture_task: None,
            event_task: None,
            stop_tx: None,
        }
    }

    pub fn state(&self) -> StreamerState {
        self.state
    }

    /// Start capturing and streaming.
    ///
    /// Acquires an audio source from `backend`; failure aborts the start and
    /// the streamer stays `Idle`. The realtime socket is best-effort: if it
    /// cannot be opened, capture proceeds batch-only. `on_text` is invoked
    /// with each finalized utterance received from the service.
    pub async fn start<F>(&mut self, mut backend: Box<dyn CaptureBackend>, on_text: F) -> Result<()>
    where
        F: Fn(String) + Send + 'static,
    {
        match self.state {
            StreamerState::Capturing => {
                warn!("Streamer already capturing: {}", self.config.session_id);
                return Ok(());
            }
            StreamerState::Closed => anyhow::bail!("Streamer is closed"),
            StreamerState::Idle => {}
        }

        info!(
            "Starting audio streamer: {} (backend: {})",
            self.config.session_id,
            backend.name()
        );

        let mut audio_rx = backend
            .start()
            .await
            .context("Failed to acquire audio source")?;

        let frames = match self.transcriber.connect(&self.config.language_code).await {
            Ok(RealtimeConnection { frames, mut events }) => {
                let event_task = tokio::spawn(async move {
                    while let Some(event) = events.recv().await {
                        if event.is_final() && !event.text.is_empty() {
                            on_text(event.text);
                        }
                    }
                });
                self.event_task = Some(event_task);
                Some(frames)
            }
            Err(e) => {
                error!(
                    "Realtime socket unavailable, continuing without live transcription: {:#}",
                    e
                );
                None
            }
        };

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let session_id = self.config.session_id.clone();
        let sample_rate = self.config.sample_rate;
        let upload_interval = self.config.upload_interval;
        let uploader = Arc::clone(&self.uploader);

        let capture_task = tokio::spawn(async move {
            let mut pending: Vec<f32> = Vec::new();
            let start = tokio::time::Instant::now();
            let mut ticker = tokio::time::interval_at(start + upload_interval, upload_interval);

            loop {
                tokio::select! {
                    block = audio_rx.recv() => match block {
                        Some(block) => {
                            Self::handle_block(&block, frames.as_ref(), &mut pending);
                        }
                        None => {
                            debug!("Audio source ended: {}", session_id);
                            break;
                        }
                    },
                    _ = ticker.tick() => {
                        Self::flush_pending(&mut pending, sample_rate, &session_id, &uploader);
                    }
                    _ = stop_rx.changed() => break,
                }
            }

            if let Err(e) = backend.stop().await {
                warn!("Failed to release audio source: {}", e);
            }
        });

        self.capture_task = Some(capture_task);
        self.stop_tx = Some(stop_tx);
        self.state = StreamerState::Capturing;

        info!("Audio streamer capturing: {}", self.config.session_id);

        Ok(())
    }

    /// Stop streaming. Idempotent; safe to call in any state, including
    /// before `start` or after a previous `stop`. In-flight batch uploads
    /// run to completion on their own tasks.
    pub async fn stop(&mut self) -> Result<()> {
        if self.state == StreamerState::Closed {
            return Ok(());
        }

        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
        }

        if let Some(task) = self.capture_task.take() {
            if let Err(e) = task.await {
                error!("Capture task panicked: {}", e);
            }
        }

        // Dropping the frame sender (held by the capture task) closes the
        // socket; the reader may still be blocked on a quiet server.
        if let Some(task) = self.event_task.take() {
            task.abort();
        }

        self.state = StreamerState::Closed;
        info!("Audio streamer stopped: {}", self.config.session_id);

        Ok(())
    }

    fn handle_block(
        block: &AudioBlock,
        frames: Option<&mpsc::Sender<Vec<u8>>>,
        pending: &mut Vec<f32>,
    ) {
        if let Some(frames) = frames {
            // Fire-and-forget: a full queue drops the frame rather than
            // suspending the capture path.
            if frames.try_send(encode::pcm16_frame(&block.samples)).is_err() {
                debug!("Realtime frame dropped (socket backpressure)");
            }
        }

        pending.extend_from_slice(&block.samples);
    }

    fn flush_pending(
        pending: &mut Vec<f32>,
        sample_rate: u32,
        session_id: &str,
        uploader: &Arc<dyn BatchUploader>,
    ) {
        if pending.is_empty() {
            return;
        }

        // Snapshot and clear before the upload starts: a failed attempt
        // loses this interval's audio but can never double-send the next.
        let merged = std::mem::take(pending);
        let sample_count = merged.len();

        let wav = match encode::encode_wav(&merged, sample_rate) {
            Ok(wav) => wav,
            Err(e) => {
                warn!("Failed to encode batch ({} samples): {}", sample_count, e);
                return;
            }
        };

        let uploader = Arc::clone(uploader);
        let session_id = session_id.to_string();
        tokio::spawn(async move {
            if let Err(e) = uploader.upload(&session_id, wav).await {
                warn!(
                    "Batch upload failed, dropping {} samples: {:#}",
                    sample_count, e
                );
            } else {
                debug!("Batch uploaded: {} samples", sample_count);
            }
        });
    }
}
