use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use meetscribe::pipeline::{
    AudioExtractor, FfmpegRunner, RecordingPipeline, TranscriptionStage, WhisperRunner,
};
use meetscribe::{create_router, AppState, Config, SqliteStore};

#[derive(Debug, Parser)]
#[command(name = "meetscribe", about = "Meeting recording and transcription service")]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(short, long, default_value = "config/meetscribe")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} v0.1.0", cfg.service.name);

    // The sqlite driver creates the file but not its directory.
    if let Some(db_path) = cfg.storage.database_url.strip_prefix("sqlite://") {
        if let Some(parent) = std::path::Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create data directory {}", parent.display())
                })?;
            }
        }
    }

    let store = Arc::new(
        SqliteStore::connect(&cfg.storage.database_url)
            .await
            .context("Failed to open store")?,
    );

    let timeout = Duration::from_secs(cfg.tools.timeout_secs);
    let extractor = AudioExtractor::new(
        Arc::new(FfmpegRunner::new(&cfg.tools.ffmpeg_path, timeout)),
        &cfg.storage.audio_dir,
    );
    let transcription = TranscriptionStage::new(
        Arc::new(WhisperRunner::new(
            &cfg.tools.whisper_path,
            &cfg.tools.whisper_model,
            &cfg.tools.language,
            timeout,
        )),
        &cfg.storage.transcript_dir,
    );
    let pipeline = Arc::new(RecordingPipeline::new(
        Arc::clone(&store),
        extractor,
        transcription,
        &cfg.storage.upload_dir,
    ));

    let state = AppState {
        store,
        pipeline,
        batch_dir: PathBuf::from(&cfg.storage.batch_dir),
    };

    let router = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
