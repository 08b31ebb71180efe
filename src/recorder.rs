use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// A time-sliced chunk of the encoded audio/video container stream.
pub type MediaChunk = Vec<u8>;

/// Produces the combined audio/video container stream for a session.
#[async_trait::async_trait]
pub trait MediaCaptureBackend: Send + Sync {
    /// Begin capture, yielding time-sliced container chunks. Failure means
    /// no stream was available and capture did not begin.
    async fn start(&mut self) -> Result<mpsc::Receiver<MediaChunk>>;

    /// Stop capture and release the stream
    async fn stop(&mut self) -> Result<()>;
}

/// Hands out a caller-supplied media chunk stream.
pub struct ChannelMediaBackend {
    rx: Option<mpsc::Receiver<MediaChunk>>,
}

impl ChannelMediaBackend {
    pub fn new(rx: mpsc::Receiver<MediaChunk>) -> Self {
        Self { rx: Some(rx) }
    }
}

#[async_trait::async_trait]
impl MediaCaptureBackend for ChannelMediaBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<MediaChunk>> {
        self.rx
            .take()
            .context("Media stream unavailable (already consumed)")
    }

    async fn stop(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Records a full session into a single container blob.
///
/// Chunks are collected as they arrive and concatenated only at `stop()`,
/// which returns the complete artifact ready for upload.
pub struct SessionRecorder {
    chunks: Arc<Mutex<Vec<MediaChunk>>>,
    collect_task: Option<JoinHandle<()>>,
    stop_tx: Option<watch::Sender<bool>>,
    backend: Option<Box<dyn MediaCaptureBackend>>,
}

impl SessionRecorder {
    pub fn new() -> Self {
        Self {
            chunks: Arc::new(Mutex::new(Vec::new())),
            collect_task: None,
            stop_tx: None,
            backend: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.backend.is_some()
    }

    /// Start recording. Fails if no stream is available or a recording is
    /// already in progress; in both cases capture does not begin.
    pub async fn start(&mut self, mut backend: Box<dyn MediaCaptureBackend>) -> Result<()> {
        if self.backend.is_some() {
            anyhow::bail!("Recording already in progress");
        }

        let mut rx = backend
            .start()
            .await
            .context("No media stream available for recording")?;

        self.chunks.lock().await.clear();

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let chunks = Arc::clone(&self.chunks);

        let collect_task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    chunk = rx.recv() => match chunk {
                        Some(chunk) => {
                            if chunk.is_empty() {
                                continue;
                            }
                            chunks.lock().await.push(chunk);
                        }
                        None => break,
                    },
                    _ = stop_rx.changed() => break,
                }
            }
        });

        self.collect_task = Some(collect_task);
        self.stop_tx = Some(stop_tx);
        self.backend = Some(backend);

        info!("Session recording started");

        Ok(())
    }

    /// Stop recording and concatenate everything captured into one blob.
    ///
    /// A stop with no active capture is a no-op returning `None`.
    pub async fn stop(&mut self) -> Result<Option<Vec<u8>>> {
        let Some(mut backend) = self.backend.take() else {
            return Ok(None);
        };

        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
        }

        if let Some(task) = self.collect_task.take() {
            if let Err(e) = task.await {
                error!("Media collection task panicked: {}", e);
            }
        }

        backend.stop().await?;

        let mut chunks = self.chunks.lock().await;
        let total: usize = chunks.iter().map(|c| c.len()).sum();
        let mut blob = Vec::with_capacity(total);
        for chunk in chunks.drain(..) {
            blob.extend_from_slice(&chunk);
        }

        info!("Session recording stopped: {} bytes", blob.len());

        Ok(Some(blob))
    }
}

impl Default for SessionRecorder {
    fn default() -> Self {
        Self::new()
    }
}
