//! The onboarding question flow.
//!
//! The flow is a linear walk over the question catalog: the next question is
//! always the first catalog-order question without an answer, progress is
//! derived from the answer map on every read, and a completed flow can be
//! linked to a post-login chat session. All state lives in the session's
//! answer map; the functions here are pure over explicit `catalog`/`answers`
//! parameters.

pub mod answers;
pub mod continuity;
pub mod presenter;
pub mod progress;
pub mod prompts;

pub use answers::submit_answer;
pub use continuity::{PriorOnboarding, resolve_session_id, APPROVED_SESSION_PREFIX};
pub use presenter::QuestionPresenter;
pub use progress::{compute_progress, next_question};
