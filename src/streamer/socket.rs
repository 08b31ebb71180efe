use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

/// Depth of the outbound frame queue. A full queue means the socket cannot
/// keep up; the capture path drops the frame instead of buffering further.
const FRAME_QUEUE_DEPTH: usize = 32;

/// Control message sent once after the socket opens to begin a stream.
#[derive(Debug, Serialize)]
struct StartStreamMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    data: StartStreamData<'a>,
}

#[derive(Debug, Serialize)]
struct StartStreamData<'a> {
    language_code: &'a str,
}

/// Event parsed from a realtime transcription service JSON message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEvent {
    pub message_type: String,
    #[serde(default)]
    pub text: String,
}

impl TranscriptEvent {
    /// Only finalized utterances carry stable text; interim hypotheses are
    /// replaced by the service as more audio arrives.
    pub fn is_final(&self) -> bool {
        self.message_type == "FinalTranscript"
    }
}

/// Handle to an open realtime transcription stream.
pub struct RealtimeConnection {
    /// Outbound binary PCM frames. Use `try_send` from the capture path:
    /// backpressure surfaces as a send failure, never as buffering.
    pub frames: mpsc::Sender<Vec<u8>>,
    /// Inbound events parsed from the service.
    pub events: mpsc::Receiver<TranscriptEvent>,
}

/// Connects to a realtime speech-to-text service.
#[async_trait::async_trait]
pub trait RealtimeTranscriber: Send + Sync {
    async fn connect(&self, language_code: &str) -> Result<RealtimeConnection>;
}

/// WebSocket-backed realtime transcriber.
///
/// Sends the stream-initiation control message, then raw 16-bit PCM frames;
/// parses the service's JSON event messages.
pub struct WsTranscriber {
    url: String,
}

impl WsTranscriber {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait::async_trait]
impl RealtimeTranscriber for WsTranscriber {
    async fn connect(&self, language_code: &str) -> Result<RealtimeConnection> {
        let (ws_stream, _) = connect_async(self.url.as_str())
            .await
            .context("Failed to connect to realtime transcription socket")?;

        info!("Realtime transcription socket opened: {}", self.url);

        let (mut write, mut read) = ws_stream.split();

        let start = serde_json::to_string(&StartStreamMessage {
            kind: "StartStream",
            data: StartStreamData { language_code },
        })?;
        write
            .send(Message::Text(start))
            .await
            .context("Failed to send stream start message")?;

        let (frame_tx, mut frame_rx) = mpsc::channel::<Vec<u8>>(FRAME_QUEUE_DEPTH);
        let (event_tx, event_rx) = mpsc::channel(64);

        // Writer task: forward PCM frames until the capture side drops the
        // sender, then close the socket.
        tokio::spawn(async move {
            while let Some(frame) = frame_rx.recv().await {
                if let Err(e) = write.send(Message::Binary(frame)).await {
                    error!("Realtime socket send failed: {}", e);
                    break;
                }
            }
            if let Err(e) = write.send(Message::Close(None)).await {
                debug!("Realtime socket close failed: {}", e);
            }
        });

        // Reader task: parse JSON event messages.
        tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        match serde_json::from_str::<TranscriptEvent>(&text) {
                            Ok(event) => {
                                if event_tx.send(event).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!("Unparseable realtime event: {}", e);
                            }
                        }
                    }
                    Ok(Message::Close(_)) => {
                        info!("Realtime socket closed by server");
                        break;
                    }
                    Err(e) => {
                        error!("Realtime socket error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
        });

        Ok(RealtimeConnection {
            frames: frame_tx,
            events: event_rx,
        })
    }
}
