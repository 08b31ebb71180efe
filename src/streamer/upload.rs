use anyhow::{Context, Result};

/// Submits one interval's accumulated audio as a WAV blob.
///
/// A failed upload drops that interval's audio; the accumulation buffer was
/// cleared before the attempt started, so there is no duplicate-send path.
#[async_trait::async_trait]
pub trait BatchUploader: Send + Sync {
    async fn upload(&self, session_id: &str, wav: Vec<u8>) -> Result<()>;
}

/// Posts WAV blobs to the batch audio boundary as a multipart form.
pub struct HttpBatchUploader {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpBatchUploader {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl BatchUploader for HttpBatchUploader {
    async fn upload(&self, session_id: &str, wav: Vec<u8>) -> Result<()> {
        let part = reqwest::multipart::Part::bytes(wav)
            .file_name(format!("{}.wav", session_id))
            .mime_str("audio/wav")
            .context("Failed to build audio part")?;

        let form = reqwest::multipart::Form::new()
            .text("session", session_id.to_string())
            .part("audio", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .context("Batch upload request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("Batch upload rejected: {}", response.status());
        }

        Ok(())
    }
}
