use super::state::AppState;
use crate::error::PipelineError;
use crate::store::Recording;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    /// Optional human-visible join code (if not provided, generated)
    pub join_code: Option<String>,

    /// Optional session title
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadRecordingResponse {
    pub recording: Recording,
    /// Path of the extracted audio file
    pub audio: String,
    /// Full transcript text produced by the pipeline
    pub transcript: String,
}

#[derive(Debug, Deserialize)]
pub struct PublishTranscriptRequest {
    pub session_id: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct BatchAudioResponse {
    pub status: String,
    pub bytes: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

fn pipeline_error_response(error: &PipelineError) -> Response {
    let status = match error {
        PipelineError::InvalidSession(_) | PipelineError::NoFileUploaded => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error!("Recording pipeline error: {}", error);
    error_response(status, error.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/sessions
/// Minimal session create so uploads have a join code to resolve
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Response {
    let join_code = req
        .join_code
        .unwrap_or_else(|| Uuid::new_v4().to_string()[..8].to_string());

    match state
        .store
        .create_session(&join_code, req.title.as_deref())
        .await
    {
        Ok(session) => {
            info!("Session created: {} (join code {})", session.id, join_code);
            (StatusCode::OK, Json(session)).into_response()
        }
        Err(e) => {
            error!("Failed to create session: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to create session: {}", e),
            )
        }
    }
}

/// POST /api/recordings
/// Multipart upload of a session recording; runs the full pipeline and
/// responds with the stored recording, extracted audio path, and transcript
pub async fn upload_recording(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut join_code: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Malformed multipart body: {}", e),
                )
            }
        };

        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("recording.webm").to_string();
                match field.bytes().await {
                    Ok(bytes) => file = Some((filename, bytes.to_vec())),
                    Err(e) => {
                        return error_response(
                            StatusCode::BAD_REQUEST,
                            format!("Failed to read upload: {}", e),
                        )
                    }
                }
            }
            "session" => match field.text().await {
                Ok(text) => join_code = Some(text),
                Err(e) => {
                    return error_response(
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read session field: {}", e),
                    )
                }
            },
            _ => {}
        }
    }

    let Some((filename, data)) = file else {
        return pipeline_error_response(&PipelineError::NoFileUploaded);
    };
    let Some(join_code) = join_code else {
        return error_response(StatusCode::BAD_REQUEST, "Missing session field".to_string());
    };

    info!(
        "Recording upload received: {} ({} bytes) for join code {}",
        filename,
        data.len(),
        join_code
    );

    match state.pipeline.ingest(&join_code, &filename, &data).await {
        Ok(output) => (
            StatusCode::OK,
            Json(UploadRecordingResponse {
                recording: output.recording,
                audio: output.audio_path.display().to_string(),
                transcript: output.transcript.text,
            }),
        )
            .into_response(),
        Err(e) => pipeline_error_response(&e),
    }
}

/// GET /api/recordings/:session_id
pub async fn get_recording(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match state.store.get_recording(&session_id).await {
        Ok(Some(recording)) => (StatusCode::OK, Json(recording)).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            format!("No recording for session {}", session_id),
        ),
        Err(e) => {
            error!("Failed to fetch recording: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to fetch recording: {}", e),
            )
        }
    }
}

/// POST /api/audio/batch
/// Periodic WAV blob from the realtime streamer; stored and acknowledged
pub async fn upload_batch_audio(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let mut audio: Option<Vec<u8>> = None;
    let mut session: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Malformed multipart body: {}", e),
                )
            }
        };

        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "audio" => match field.bytes().await {
                Ok(bytes) => audio = Some(bytes.to_vec()),
                Err(e) => {
                    return error_response(
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read audio: {}", e),
                    )
                }
            },
            "session" => match field.text().await {
                Ok(text) => session = Some(text),
                Err(e) => {
                    return error_response(
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read session field: {}", e),
                    )
                }
            },
            _ => {}
        }
    }

    let Some(audio) = audio else {
        return error_response(StatusCode::BAD_REQUEST, "No audio supplied".to_string());
    };

    let session = session.unwrap_or_else(|| "unknown".to_string());
    let filename = format!("{}-{}.wav", session, Uuid::new_v4());
    let path = state.batch_dir.join(&filename);

    if let Err(e) = tokio::fs::create_dir_all(&state.batch_dir).await {
        error!("Failed to create batch directory: {}", e);
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to store batch audio: {}", e),
        );
    }
    if let Err(e) = tokio::fs::write(&path, &audio).await {
        error!("Failed to store batch audio: {}", e);
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to store batch audio: {}", e),
        );
    }

    info!(
        "Batch audio received: {} bytes from session {} -> {}",
        audio.len(),
        session,
        path.display()
    );

    (
        StatusCode::OK,
        Json(BatchAudioResponse {
            status: "received".to_string(),
            bytes: audio.len(),
        }),
    )
        .into_response()
}

/// POST /api/transcripts
/// Direct transcript upsert (idempotent re-publish)
pub async fn publish_transcript(
    State(state): State<AppState>,
    Json(req): Json<PublishTranscriptRequest>,
) -> Response {
    match state
        .pipeline
        .publisher()
        .publish(&req.session_id, &req.text)
        .await
    {
        Ok(transcript) => (StatusCode::OK, Json(transcript)).into_response(),
        Err(e) => pipeline_error_response(&e),
    }
}

/// GET /api/transcripts/:session_id
pub async fn get_transcript(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match state.store.get_transcript(&session_id).await {
        Ok(Some(transcript)) => (StatusCode::OK, Json(transcript)).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            format!("No transcript for session {}", session_id),
        ),
        Err(e) => {
            error!("Failed to fetch transcript: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to fetch transcript: {}", e),
            )
        }
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
