// Integration tests for the recording pipeline
//
// Stub tool runners stand in for the transcoder and the speech-to-text
// engine so orchestration, failure handling, and persistence can be
// exercised hermetically.

use anyhow::Result;
use async_trait::async_trait;
use meetscribe::audio::encode_wav;
use meetscribe::pipeline::{
    AudioExtractor, RecordingPipeline, ToolRunner, TranscriptionStage,
};
use meetscribe::{PipelineError, SqliteStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Writes a small derived file, like a well-behaved external tool.
struct StubRunner {
    extension: &'static str,
    content: &'static str,
}

#[async_trait]
impl ToolRunner for StubRunner {
    async fn run(&self, input: &Path, output_dir: &Path) -> Result<PathBuf> {
        let stem = input.file_stem().unwrap().to_str().unwrap();
        let output = output_dir.join(format!("{}.{}", stem, self.extension));
        tokio::fs::write(&output, self.content).await?;
        Ok(output)
    }
}

/// Fails like a crashed external process.
struct FailingRunner;

#[async_trait]
impl ToolRunner for FailingRunner {
    async fn run(&self, _input: &Path, _output_dir: &Path) -> Result<PathBuf> {
        anyhow::bail!("exit status: 1: unsupported codec")
    }
}

/// Exits cleanly but writes nothing where the pipeline expects output.
struct SilentRunner {
    extension: &'static str,
}

#[async_trait]
impl ToolRunner for SilentRunner {
    async fn run(&self, input: &Path, output_dir: &Path) -> Result<PathBuf> {
        let stem = input.file_stem().unwrap().to_str().unwrap();
        Ok(output_dir.join(format!("{}.{}", stem, self.extension)))
    }
}

struct Fixture {
    store: Arc<SqliteStore>,
    pipeline: RecordingPipeline,
    _temp: TempDir,
}

async fn fixture(
    extract: Arc<dyn ToolRunner>,
    transcribe: Arc<dyn ToolRunner>,
) -> Result<Fixture> {
    let temp = TempDir::new()?;
    let store = Arc::new(SqliteStore::in_memory().await?);

    let extractor = AudioExtractor::new(extract, temp.path().join("audio"));
    let transcription = TranscriptionStage::new(transcribe, temp.path().join("transcripts"));
    let pipeline = RecordingPipeline::new(
        Arc::clone(&store),
        extractor,
        transcription,
        temp.path().join("uploads"),
    );

    Ok(Fixture {
        store,
        pipeline,
        _temp: temp,
    })
}

/// Two seconds of 16kHz silence in a WAV container.
fn silent_recording() -> Vec<u8> {
    encode_wav(&vec![0.0f32; 32000], 16000).unwrap()
}

#[tokio::test]
async fn test_end_to_end_upload_produces_transcript() -> Result<()> {
    let fx = fixture(
        Arc::new(StubRunner {
            extension: "mp3",
            content: "mp3 audio bytes",
        }),
        Arc::new(StubRunner {
            extension: "txt",
            content: "hello world",
        }),
    )
    .await?;

    let session = fx.store.create_session("s1-join", Some("standup")).await?;

    let output = fx
        .pipeline
        .ingest("s1-join", "meeting.wav", &silent_recording())
        .await?;

    assert_eq!(output.transcript.text, "hello world");
    assert_eq!(output.recording.session_id, session.id);
    assert!(output.audio_path.exists(), "extracted audio file exists");
    assert!(std::fs::metadata(&output.audio_path)?.len() > 0);

    let stored = fx
        .store
        .get_transcript(&session.id)
        .await?
        .expect("transcript persisted");
    assert_eq!(stored.text, "hello world");

    Ok(())
}

#[tokio::test]
async fn test_invalid_session_creates_nothing() -> Result<()> {
    let fx = fixture(
        Arc::new(StubRunner {
            extension: "mp3",
            content: "audio",
        }),
        Arc::new(StubRunner {
            extension: "txt",
            content: "text",
        }),
    )
    .await?;

    let err = fx
        .pipeline
        .ingest("unknown-code", "meeting.webm", b"video bytes")
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidSession(_)), "got {err}");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recordings")
        .fetch_one(fx.store.pool())
        .await?;
    assert_eq!(count, 0, "no partial recording row");

    Ok(())
}

#[tokio::test]
async fn test_extraction_failure_halts_pipeline() -> Result<()> {
    let fx = fixture(
        Arc::new(FailingRunner),
        Arc::new(StubRunner {
            extension: "txt",
            content: "never read",
        }),
    )
    .await?;

    let session = fx.store.create_session("s2-join", None).await?;

    let err = fx
        .pipeline
        .ingest("s2-join", "meeting.webm", b"video bytes")
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::ExtractionFailed(_)), "got {err}");

    assert!(
        fx.store.get_transcript(&session.id).await?.is_none(),
        "no transcript after a failed extraction"
    );
    assert!(
        fx.store.get_recording(&session.id).await?.is_some(),
        "the upload itself was already persisted"
    );

    Ok(())
}

#[tokio::test]
async fn test_transcription_process_failure() -> Result<()> {
    let fx = fixture(
        Arc::new(StubRunner {
            extension: "mp3",
            content: "audio",
        }),
        Arc::new(FailingRunner),
    )
    .await?;

    let session = fx.store.create_session("s3-join", None).await?;

    let err = fx
        .pipeline
        .ingest("s3-join", "meeting.webm", b"video bytes")
        .await
        .unwrap_err();
    assert!(
        matches!(err, PipelineError::TranscriptionFailed(_)),
        "got {err}"
    );
    assert!(fx.store.get_transcript(&session.id).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_missing_transcript_output_is_distinct() -> Result<()> {
    let fx = fixture(
        Arc::new(StubRunner {
            extension: "mp3",
            content: "audio",
        }),
        // The engine "succeeds" but writes under a different name.
        Arc::new(SilentRunner { extension: "txt" }),
    )
    .await?;

    fx.store.create_session("s4-join", None).await?;

    let err = fx
        .pipeline
        .ingest("s4-join", "meeting.webm", b"video bytes")
        .await
        .unwrap_err();
    assert!(
        matches!(err, PipelineError::TranscriptMissing(_)),
        "got {err}"
    );

    Ok(())
}

#[tokio::test]
async fn test_reupload_replaces_recording() -> Result<()> {
    let fx = fixture(
        Arc::new(StubRunner {
            extension: "mp3",
            content: "audio",
        }),
        Arc::new(StubRunner {
            extension: "txt",
            content: "take two",
        }),
    )
    .await?;

    let session = fx.store.create_session("s5-join", None).await?;

    let first = fx
        .pipeline
        .ingest("s5-join", "meeting.webm", b"first upload")
        .await?;
    let second = fx
        .pipeline
        .ingest("s5-join", "meeting.webm", b"second upload")
        .await?;

    assert_ne!(
        first.recording.storage_path, second.recording.storage_path,
        "each upload gets a unique stored name"
    );

    let stored = fx.store.get_recording(&session.id).await?.unwrap();
    assert_eq!(stored.storage_path, second.recording.storage_path);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recordings")
        .fetch_one(fx.store.pool())
        .await?;
    assert_eq!(count, 1);

    Ok(())
}

#[tokio::test]
async fn test_direct_publish_is_idempotent() -> Result<()> {
    let fx = fixture(
        Arc::new(StubRunner {
            extension: "mp3",
            content: "audio",
        }),
        Arc::new(StubRunner {
            extension: "txt",
            content: "text",
        }),
    )
    .await?;

    let session = fx.store.create_session("s6-join", None).await?;

    fx.pipeline
        .publisher()
        .publish(&session.id, "manual transcript")
        .await?;
    fx.pipeline
        .publisher()
        .publish(&session.id, "manual transcript, corrected")
        .await?;

    let stored = fx.store.get_transcript(&session.id).await?.unwrap();
    assert_eq!(stored.text, "manual transcript, corrected");

    Ok(())
}
