// Integration tests for the session recorder
//
// These tests verify chunk collection, blob concatenation at stop, and the
// start/stop guards.

use anyhow::Result;
use meetscribe::recorder::{ChannelMediaBackend, MediaCaptureBackend, SessionRecorder};
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::test]
async fn test_chunks_concatenate_into_single_blob() -> Result<()> {
    let (tx, rx) = mpsc::channel(16);
    let mut recorder = SessionRecorder::new();

    recorder.start(Box::new(ChannelMediaBackend::new(rx))).await?;
    assert!(recorder.is_recording());

    tx.send(b"webm-header".to_vec()).await?;
    tx.send(b"|slice-1".to_vec()).await?;
    tx.send(Vec::new()).await?; // empty slices are skipped
    tx.send(b"|slice-2".to_vec()).await?;
    drop(tx);

    // Let the collector drain before stopping
    tokio::time::sleep(Duration::from_millis(50)).await;

    let blob = recorder.stop().await?.expect("capture was active");
    assert_eq!(blob, b"webm-header|slice-1|slice-2");
    assert!(!recorder.is_recording());

    Ok(())
}

#[tokio::test]
async fn test_stop_while_stream_still_open() -> Result<()> {
    let (tx, rx) = mpsc::channel(16);
    let mut recorder = SessionRecorder::new();

    recorder.start(Box::new(ChannelMediaBackend::new(rx))).await?;
    tx.send(b"partial".to_vec()).await?;
    tokio::time::sleep(Duration::from_millis(50)).await;

    // The sender is still alive; stop must not hang on it
    let blob = recorder.stop().await?.expect("capture was active");
    assert_eq!(blob, b"partial");

    Ok(())
}

#[tokio::test]
async fn test_stop_without_start_is_noop() -> Result<()> {
    let mut recorder = SessionRecorder::new();

    assert!(recorder.stop().await?.is_none());
    assert!(recorder.stop().await?.is_none(), "safe to call repeatedly");

    Ok(())
}

#[tokio::test]
async fn test_start_without_stream_fails() -> Result<()> {
    let (_tx, rx) = mpsc::channel::<Vec<u8>>(1);
    let mut backend = ChannelMediaBackend::new(rx);
    backend.start().await?; // exhaust the stream

    let mut recorder = SessionRecorder::new();
    let result = recorder.start(Box::new(backend)).await;

    assert!(result.is_err(), "no stream means capture does not begin");
    assert!(!recorder.is_recording());
    assert!(recorder.stop().await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_start_while_recording_fails() -> Result<()> {
    let (_tx1, rx1) = mpsc::channel(1);
    let (_tx2, rx2) = mpsc::channel(1);
    let mut recorder = SessionRecorder::new();

    recorder
        .start(Box::new(ChannelMediaBackend::new(rx1)))
        .await?;

    let result = recorder.start(Box::new(ChannelMediaBackend::new(rx2))).await;
    assert!(result.is_err());
    assert!(recorder.is_recording(), "original capture unaffected");

    recorder.stop().await?;

    Ok(())
}
