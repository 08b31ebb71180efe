use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::info;

/// A fixed-size buffer of float samples captured from an audio source.
///
/// Blocks exist only in memory between capture and either framing for the
/// realtime socket or accumulation into a periodic batch.
#[derive(Debug, Clone)]
pub struct AudioBlock {
    /// Samples in [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

/// Audio capture backend trait
///
/// Implementations:
/// - `WavFileBackend`: replay a WAV file (testing/batch processing)
/// - `ChannelBackend`: caller-supplied block stream (testing/embedding)
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio blocks. Failure
    /// means no source was available and capture did not begin.
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioBlock>>;

    /// Stop capturing and release the source
    async fn stop(&mut self) -> Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Streams a WAV file as fixed-size audio blocks.
pub struct WavFileBackend {
    path: PathBuf,
    block_size: usize,
    capturing: bool,
}

impl WavFileBackend {
    pub fn new(path: impl Into<PathBuf>, block_size: usize) -> Self {
        Self {
            path: path.into(),
            block_size,
            capturing: false,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for WavFileBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioBlock>> {
        let reader = hound::WavReader::open(&self.path)
            .with_context(|| format!("Failed to open WAV file: {}", self.path.display()))?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Int => reader
                .into_samples::<i16>()
                .map(|s| s.map(|v| v as f32 / 32768.0))
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to read audio samples")?,
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to read audio samples")?,
        };

        info!(
            "Replaying {} samples at {}Hz from {}",
            samples.len(),
            spec.sample_rate,
            self.path.display()
        );

        let (tx, rx) = mpsc::channel(64);
        let block_size = self.block_size;
        let sample_rate = spec.sample_rate;

        tokio::spawn(async move {
            for chunk in samples.chunks(block_size) {
                let block = AudioBlock {
                    samples: chunk.to_vec(),
                    sample_rate,
                };
                if tx.send(block).await.is_err() {
                    break;
                }
            }
        });

        self.capturing = true;
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.capturing = false;
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "wav-file"
    }
}

/// Hands out a caller-supplied block stream.
///
/// The caller keeps the sender half; dropping it ends the capture. A second
/// `start` fails because the stream was already handed out.
pub struct ChannelBackend {
    rx: Option<mpsc::Receiver<AudioBlock>>,
    capturing: bool,
}

impl ChannelBackend {
    pub fn new(rx: mpsc::Receiver<AudioBlock>) -> Self {
        Self {
            rx: Some(rx),
            capturing: false,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for ChannelBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioBlock>> {
        let rx = self
            .rx
            .take()
            .context("Audio stream unavailable (already consumed)")?;
        self.capturing = true;
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.capturing = false;
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "channel"
    }
}
