//! Session and progress models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Answers keyed by question id. Values are whatever JSON the client sent —
/// strings for free-text and option questions, but no schema is enforced
/// beyond string keys.
pub type AnswerMap = serde_json::Map<String, serde_json::Value>;

/// An onboarding session: an opaque, externally assigned id accumulating
/// question answers, optionally linked to an authenticated user later.
///
/// Created lazily on the first answer submission; never deleted by this
/// service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingSession {
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub answers: AnswerMap,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Where a session is in the flow. Derived, never stored.
///
/// Progresses strictly forward: NotStarted → InProgress → Completed.
/// Revising an answer in place does not move the state backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    NotStarted,
    InProgress,
    Completed,
}

impl FlowState {
    /// Whether this state is terminal for the onboarding flow.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for FlowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

/// Derived progress over the catalog. Recomputed on every read from the
/// session's answers — never persisted, so it cannot drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Count of answered questions that exist in the catalog.
    pub answered: usize,
    /// Catalog size.
    pub total: usize,
    /// First unanswered question in catalog order, or `None` when complete.
    pub current_question_id: Option<String>,
}

impl Progress {
    /// Whether every catalog question has an answer.
    pub fn is_complete(&self) -> bool {
        self.current_question_id.is_none()
    }

    pub fn state(&self) -> FlowState {
        if self.is_complete() {
            FlowState::Completed
        } else if self.answered == 0 {
            FlowState::NotStarted
        } else {
            FlowState::InProgress
        }
    }
}
