use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use super::models::{Recording, Session, Transcript};

/// SQLite-backed store for sessions, recordings, and transcripts.
///
/// The one-row-per-session invariants are enforced with keyed upserts
/// (`INSERT .. ON CONFLICT .. DO UPDATE`), so no application-level locking
/// is needed around concurrent pipelines.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `database_url` and ensure
    /// the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let store = Self::with_options(options, 5).await?;
        info!("Store opened: {}", database_url);
        Ok(store)
    }

    /// In-memory store for tests. Single connection: each sqlite `:memory:`
    /// connection is its own database.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        Self::with_options(SqliteConnectOptions::from_str("sqlite::memory:")?, 1).await
    }

    async fn with_options(
        options: SqliteConnectOptions,
        max_connections: u32,
    ) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.create_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                join_code TEXT NOT NULL UNIQUE,
                title TEXT,
                started_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS recordings (
                session_id TEXT PRIMARY KEY,
                storage_path TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS transcripts (
                session_id TEXT PRIMARY KEY,
                text TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn create_session(
        &self,
        join_code: &str,
        title: Option<&str>,
    ) -> Result<Session, sqlx::Error> {
        let session = Session {
            id: Uuid::new_v4().to_string(),
            join_code: join_code.to_string(),
            title: title.map(|t| t.to_string()),
            started_at: Utc::now(),
        };

        sqlx::query("INSERT INTO sessions (id, join_code, title, started_at) VALUES (?, ?, ?, ?)")
            .bind(&session.id)
            .bind(&session.join_code)
            .bind(&session.title)
            .bind(session.started_at)
            .execute(&self.pool)
            .await?;

        Ok(session)
    }

    pub async fn find_session_by_join_code(
        &self,
        join_code: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        sqlx::query_as::<_, Session>(
            "SELECT id, join_code, title, started_at FROM sessions WHERE join_code = ?",
        )
        .bind(join_code)
        .fetch_optional(&self.pool)
        .await
    }

    /// Create or overwrite the recording for a session.
    pub async fn upsert_recording(
        &self,
        session_id: &str,
        storage_path: &str,
    ) -> Result<Recording, sqlx::Error> {
        let updated_at = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO recordings (session_id, storage_path, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(session_id) DO UPDATE SET
                storage_path = excluded.storage_path,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(session_id)
        .bind(storage_path)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        Ok(Recording {
            session_id: session_id.to_string(),
            storage_path: storage_path.to_string(),
            updated_at,
        })
    }

    pub async fn get_recording(
        &self,
        session_id: &str,
    ) -> Result<Option<Recording>, sqlx::Error> {
        sqlx::query_as::<_, Recording>(
            "SELECT session_id, storage_path, updated_at FROM recordings WHERE session_id = ?",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Create or overwrite the transcript for a session.
    pub async fn upsert_transcript(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<Transcript, sqlx::Error> {
        let updated_at = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO transcripts (session_id, text, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(session_id) DO UPDATE SET
                text = excluded.text,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(session_id)
        .bind(text)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        Ok(Transcript {
            session_id: session_id.to_string(),
            text: text.to_string(),
            updated_at,
        })
    }

    pub async fn get_transcript(
        &self,
        session_id: &str,
    ) -> Result<Option<Transcript>, sqlx::Error> {
        sqlx::query_as::<_, Transcript>(
            "SELECT session_id, text, updated_at FROM transcripts WHERE session_id = ?",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
    }
}
