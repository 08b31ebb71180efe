use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub tools: ToolsConfig,
    pub realtime: RealtimeConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    pub database_url: String,
    pub upload_dir: String,
    pub audio_dir: String,
    pub transcript_dir: String,
    pub batch_dir: String,
}

#[derive(Debug, Deserialize)]
pub struct ToolsConfig {
    pub ffmpeg_path: String,
    pub whisper_path: String,
    pub whisper_model: String,
    pub language: String,
    /// Upper bound for one external tool invocation, in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct RealtimeConfig {
    pub socket_url: String,
    pub language_code: String,
    pub sample_rate: u32,
    pub upload_interval_secs: u64,
    /// Where the periodic batch uploader posts its WAV blobs
    pub batch_endpoint: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
