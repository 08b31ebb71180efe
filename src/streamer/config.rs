use std::time::Duration;

/// Configuration for a realtime streaming session
#[derive(Debug, Clone)]
pub struct StreamerConfig {
    /// Session the streamed audio belongs to
    pub session_id: String,

    /// Sample rate of the captured audio in Hz
    pub sample_rate: u32,

    /// Language declared in the stream-initiation control message
    pub language_code: String,

    /// Interval between batch uploads of accumulated audio
    /// Default: 5 seconds
    pub upload_interval: Duration,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            session_id: format!("session-{}", uuid::Uuid::new_v4()),
            sample_rate: 16000,
            language_code: "en_us".to_string(),
            upload_interval: Duration::from_secs(5),
        }
    }
}
