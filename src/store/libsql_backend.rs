//! libSQL backend — async `SessionStore` implementation.
//!
//! Supports local file and in-memory databases. The answer merge is a single
//! `INSERT .. ON CONFLICT .. json_set` statement, so concurrent submissions
//! for the same session merge instead of overwriting each other.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::session::{AnswerMap, OnboardingSession};
use crate::store::migrations;
use crate::store::traits::SessionStore;

const SESSION_COLUMNS: &str = "session_id, user_id, answers, created_at, updated_at";

/// libSQL session store.
///
/// Holds a single connection reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Open(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Open(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Open(format!("Failed to create connection: {e}")))?;

        let store = Self {
            db: Arc::new(db),
            conn,
        };
        store.run_migrations().await?;
        info!(path = %path.display(), "Session store opened");
        Ok(store)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StoreError::Open(format!("Failed to create in-memory database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Open(format!("Failed to create connection: {e}")))?;

        let store = Self {
            db: Arc::new(db),
            conn,
        };
        store.run_migrations().await?;
        Ok(store)
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 datetime string from a session row.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| DateTime::<Utc>::MIN_UTC)
}

/// Map a libsql row to an OnboardingSession.
///
/// Column order matches SESSION_COLUMNS:
/// 0:session_id, 1:user_id, 2:answers, 3:created_at, 4:updated_at
fn row_to_session(row: &libsql::Row) -> Result<OnboardingSession, StoreError> {
    let session_id: String = row
        .get(0)
        .map_err(|e| StoreError::Query(format!("Failed to read session_id: {e}")))?;
    // user_id is nullable — a failed read means NULL.
    let user_id: Option<String> = row.get(1).ok();
    let answers_raw: String = row
        .get(2)
        .map_err(|e| StoreError::Query(format!("Failed to read answers: {e}")))?;
    let created_str: String = row
        .get(3)
        .map_err(|e| StoreError::Query(format!("Failed to read created_at: {e}")))?;
    let updated_str: String = row
        .get(4)
        .map_err(|e| StoreError::Query(format!("Failed to read updated_at: {e}")))?;

    let answers: AnswerMap = serde_json::from_str(&answers_raw).map_err(|e| {
        StoreError::Corrupt(format!("answers for session {session_id} is not a JSON object: {e}"))
    })?;

    Ok(OnboardingSession {
        session_id,
        user_id,
        answers,
        created_at: parse_datetime(&created_str),
        updated_at: parse_datetime(&updated_str),
    })
}

#[async_trait]
impl SessionStore for LibSqlStore {
    async fn run_migrations(&self) -> Result<(), StoreError> {
        migrations::run_migrations(self.conn()).await
    }

    async fn find_by_session_id(
        &self,
        session_id: &str,
    ) -> Result<Option<OnboardingSession>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {SESSION_COLUMNS} FROM onboarding_sessions WHERE session_id = ?1"
                ),
                params![session_id],
            )
            .await
            .map_err(|e| StoreError::Query(format!("Session lookup failed: {e}")))?;

        match rows
            .next()
            .await
            .map_err(|e| StoreError::Query(format!("Session row read failed: {e}")))?
        {
            Some(row) => Ok(Some(row_to_session(&row)?)),
            None => Ok(None),
        }
    }

    async fn upsert_answer(
        &self,
        session_id: &str,
        question_id: &str,
        value: &serde_json::Value,
    ) -> Result<OnboardingSession, StoreError> {
        let value_json = serde_json::to_string(value)
            .map_err(|e| StoreError::Query(format!("Failed to serialize answer: {e}")))?;
        let now = Utc::now().to_rfc3339();

        // Single-statement merge: the answer lands inside the stored JSON map
        // without a read-modify-write of the whole row, so two concurrent
        // submissions for different question ids both survive. The question
        // id is quoted into the JSON path; the flow layer restricts ids to a
        // slug charset that cannot escape it.
        self.conn()
            .execute(
                "INSERT INTO onboarding_sessions (session_id, answers, created_at, updated_at)
                 VALUES (?1, json_object(?2, json(?3)), ?4, ?4)
                 ON CONFLICT(session_id) DO UPDATE SET
                    answers = json_set(answers, '$.\"' || ?2 || '\"', json(?3)),
                    updated_at = ?4",
                params![session_id, question_id, value_json, now],
            )
            .await
            .map_err(|e| StoreError::Query(format!("Answer upsert failed: {e}")))?;

        debug!(session_id, question_id, "Answer upserted");

        self.find_by_session_id(session_id).await?.ok_or_else(|| {
            StoreError::Query(format!("Session {session_id} missing after upsert"))
        })
    }

    async fn attach_user(&self, session_id: &str, user_id: &str) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        let affected = self
            .conn()
            .execute(
                "UPDATE onboarding_sessions
                 SET user_id = ?2, updated_at = ?3
                 WHERE session_id = ?1 AND (user_id IS NULL OR user_id = ?2)",
                params![session_id, user_id, now],
            )
            .await
            .map_err(|e| StoreError::Query(format!("User attach failed: {e}")))?;

        debug!(session_id, user_id, affected, "User attached to session");
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> LibSqlStore {
        LibSqlStore::new_memory().await.unwrap()
    }

    #[tokio::test]
    async fn upsert_creates_session_lazily() {
        let store = test_store().await;
        assert!(store.find_by_session_id("s1").await.unwrap().is_none());

        let session = store
            .upsert_answer("s1", "name", &serde_json::json!("Anna"))
            .await
            .unwrap();

        assert_eq!(session.session_id, "s1");
        assert_eq!(session.answers["name"], "Anna");
        assert_eq!(session.answers.len(), 1);
        assert!(session.user_id.is_none());
    }

    #[tokio::test]
    async fn upsert_merges_into_existing_session() {
        let store = test_store().await;
        store
            .upsert_answer("s1", "name", &serde_json::json!("Anna"))
            .await
            .unwrap();
        let session = store
            .upsert_answer("s1", "role", &serde_json::json!("mother"))
            .await
            .unwrap();

        assert_eq!(session.answers.len(), 2);
        assert_eq!(session.answers["name"], "Anna");
        assert_eq!(session.answers["role"], "mother");
    }

    #[tokio::test]
    async fn resubmission_is_idempotent() {
        let store = test_store().await;
        store
            .upsert_answer("s1", "name", &serde_json::json!("Anna"))
            .await
            .unwrap();
        let session = store
            .upsert_answer("s1", "name", &serde_json::json!("Anna"))
            .await
            .unwrap();

        assert_eq!(session.answers.len(), 1);
        assert_eq!(session.answers["name"], "Anna");
    }

    #[tokio::test]
    async fn revision_overwrites_in_place() {
        let store = test_store().await;
        store
            .upsert_answer("s1", "q1", &serde_json::json!("a"))
            .await
            .unwrap();
        let session = store
            .upsert_answer("s1", "q1", &serde_json::json!("b"))
            .await
            .unwrap();

        assert_eq!(session.answers["q1"], "b");
        assert_eq!(session.answers.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_submissions_both_survive() {
        let store = Arc::new(test_store().await);

        let a = serde_json::json!("a");
        let b = serde_json::json!("b");
        let (first, second) = tokio::join!(
            store.upsert_answer("s1", "q1", &a),
            store.upsert_answer("s1", "q2", &b),
        );
        first.unwrap();
        second.unwrap();

        let session = store.find_by_session_id("s1").await.unwrap().unwrap();
        assert_eq!(session.answers["q1"], "a");
        assert_eq!(session.answers["q2"], "b");
    }

    #[tokio::test]
    async fn non_string_values_roundtrip() {
        let store = test_store().await;
        let session = store
            .upsert_answer("s1", "children_count", &serde_json::json!(2))
            .await
            .unwrap();
        assert_eq!(session.answers["children_count"], 2);

        let session = store
            .upsert_answer("s1", "consent", &serde_json::json!(true))
            .await
            .unwrap();
        assert_eq!(session.answers["consent"], true);
    }

    #[tokio::test]
    async fn answers_with_dotted_ids_stay_flat() {
        // A dotted id must become one flat key, not a nested object.
        let store = test_store().await;
        let session = store
            .upsert_answer("s1", "contact.email", &serde_json::json!("a@b.dk"))
            .await
            .unwrap();
        assert_eq!(session.answers["contact.email"], "a@b.dk");
        assert_eq!(session.answers.len(), 1);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = test_store().await;
        store
            .upsert_answer("s1", "name", &serde_json::json!("Anna"))
            .await
            .unwrap();
        store
            .upsert_answer("s2", "name", &serde_json::json!("Bo"))
            .await
            .unwrap();

        let s1 = store.find_by_session_id("s1").await.unwrap().unwrap();
        let s2 = store.find_by_session_id("s2").await.unwrap().unwrap();
        assert_eq!(s1.answers["name"], "Anna");
        assert_eq!(s2.answers["name"], "Bo");
    }

    #[tokio::test]
    async fn attach_user_links_session() {
        let store = test_store().await;
        store
            .upsert_answer("s1", "name", &serde_json::json!("Anna"))
            .await
            .unwrap();

        store.attach_user("s1", "u42").await.unwrap();
        let session = store.find_by_session_id("s1").await.unwrap().unwrap();
        assert_eq!(session.user_id.as_deref(), Some("u42"));

        // Re-attaching the same user is a no-op; another user does not steal
        // the session.
        store.attach_user("s1", "u42").await.unwrap();
        store.attach_user("s1", "u99").await.unwrap();
        let session = store.find_by_session_id("s1").await.unwrap().unwrap();
        assert_eq!(session.user_id.as_deref(), Some("u42"));
    }

    #[tokio::test]
    async fn migrations_are_rerunnable() {
        let store = test_store().await;
        // new_memory already ran them once.
        store.run_migrations().await.unwrap();
        store
            .upsert_answer("s1", "name", &serde_json::json!("Anna"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn timestamps_are_set_and_updated() {
        let store = test_store().await;
        let created = store
            .upsert_answer("s1", "q1", &serde_json::json!("a"))
            .await
            .unwrap();
        assert!(created.created_at > DateTime::<Utc>::MIN_UTC);
        assert_eq!(created.created_at, created.updated_at);

        let updated = store
            .upsert_answer("s1", "q2", &serde_json::json!("b"))
            .await
            .unwrap();
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= updated.created_at);
    }
}
