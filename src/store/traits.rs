//! `SessionStore` trait — the async persistence interface for onboarding
//! sessions.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::session::OnboardingSession;

/// Backend-agnostic session storage, keyed by opaque session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), StoreError>;

    /// Look up a session by id.
    async fn find_by_session_id(
        &self,
        session_id: &str,
    ) -> Result<Option<OnboardingSession>, StoreError>;

    /// Merge one answer into a session, creating the session if it does not
    /// exist yet. Last write wins per question id.
    ///
    /// Implementations MUST apply the merge atomically — a single statement
    /// that merges into the stored answer map, or an equivalent locked
    /// read-modify-write — so concurrent submissions for different question
    /// ids of the same session cannot lose updates. Returns the updated
    /// session.
    async fn upsert_answer(
        &self,
        session_id: &str,
        question_id: &str,
        value: &serde_json::Value,
    ) -> Result<OnboardingSession, StoreError>;

    /// Associate a session with an authenticated user. A session links to at
    /// most one user; repeated calls with the same user are no-ops.
    async fn attach_user(&self, session_id: &str, user_id: &str) -> Result<(), StoreError>;
}
