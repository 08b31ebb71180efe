use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One meeting/call instance being recorded and transcribed.
///
/// Created by the scheduling layer; the pipeline only reads it, resolving
/// uploads by `join_code`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub id: String,
    /// Human-visible code participants use to join; unique across sessions
    pub join_code: String,
    pub title: Option<String>,
    pub started_at: DateTime<Utc>,
}

/// The stored audio+video artifact for a session.
///
/// At most one per session: a re-upload overwrites `storage_path` instead of
/// creating a second row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recording {
    pub session_id: String,
    pub storage_path: String,
    pub updated_at: DateTime<Utc>,
}

/// The stored speech-to-text output for a session.
///
/// At most one per session; later writes overwrite earlier ones.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Transcript {
    pub session_id: String,
    pub text: String,
    pub updated_at: DateTime<Utc>,
}
