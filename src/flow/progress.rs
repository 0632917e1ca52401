//! Progress tracking — which question comes next, and how far along a
//! session is.

use crate::catalog::{Question, QuestionCatalog};
use crate::session::{AnswerMap, Progress};

/// The first question in catalog order whose id has no answer yet, or `None`
/// when every question is answered (completion).
///
/// Deterministic and side-effect free; catalog order is the only ordering —
/// the order answers were submitted in never matters.
pub fn next_question<'a>(
    catalog: &'a QuestionCatalog,
    answers: &AnswerMap,
) -> Option<&'a Question> {
    catalog
        .questions()
        .iter()
        .find(|q| !answers.contains_key(&q.id))
}

/// Compute derived progress for a session.
///
/// Answer keys that don't exist in the catalog are ignored — stale keys from
/// an older catalog revision must not inflate the count.
pub fn compute_progress(catalog: &QuestionCatalog, answers: &AnswerMap) -> Progress {
    let answered = catalog
        .questions()
        .iter()
        .filter(|q| answers.contains_key(&q.id))
        .count();

    Progress {
        answered,
        total: catalog.len(),
        current_question_id: next_question(catalog, answers).map(|q| q.id.clone()),
    }
}
