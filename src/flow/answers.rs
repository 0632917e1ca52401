//! Answer submission — validation plus the persistent upsert.

use crate::error::{Error, ValidationError};
use crate::session::OnboardingSession;
use crate::store::SessionStore;

/// Longest accepted question id.
const MAX_QUESTION_ID_LEN: usize = 128;

/// Validate a question id.
///
/// Beyond non-emptiness, ids are held to a slug charset: the id is spliced
/// into a JSON path inside the store's single-statement merge, and the
/// charset keeps that path inert.
fn validate_question_id(question_id: &str) -> Result<(), ValidationError> {
    if question_id.is_empty() {
        return Err(ValidationError::EmptyQuestionId);
    }
    if question_id.len() > MAX_QUESTION_ID_LEN
        || !question_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(ValidationError::InvalidQuestionId {
            id: question_id.to_string(),
        });
    }
    Ok(())
}

/// Submit one answer for a session.
///
/// Validates the question id and value, then merges the answer into the
/// session (created lazily on first submission). Resubmitting the same
/// answer is idempotent; resubmitting a different value revises the answer
/// in place without advancing progress twice.
pub async fn submit_answer(
    store: &dyn SessionStore,
    session_id: &str,
    question_id: &str,
    value: &serde_json::Value,
) -> Result<OnboardingSession, Error> {
    validate_question_id(question_id)?;
    if value.is_null() {
        return Err(ValidationError::MissingValue.into());
    }

    let session = store.upsert_answer(session_id, question_id, value).await?;
    tracing::debug!(
        session_id,
        question_id,
        answered = session.answers.len(),
        "Answer accepted"
    );
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::store::LibSqlStore;

    async fn test_store() -> LibSqlStore {
        LibSqlStore::new_memory().await.unwrap()
    }

    #[tokio::test]
    async fn accepts_valid_submission() {
        let store = test_store().await;
        let session = submit_answer(&store, "s1", "name", &serde_json::json!("Anna"))
            .await
            .unwrap();
        assert_eq!(session.answers["name"], "Anna");
    }

    #[tokio::test]
    async fn rejects_empty_question_id() {
        let store = test_store().await;
        let err = submit_answer(&store, "s1", "", &serde_json::json!("x"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::EmptyQuestionId)
        ));
    }

    #[tokio::test]
    async fn rejects_null_value() {
        let store = test_store().await;
        let err = submit_answer(&store, "s1", "name", &serde_json::Value::Null)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::MissingValue)
        ));
    }

    #[tokio::test]
    async fn rejects_ids_outside_slug_charset() {
        let store = test_store().await;
        for bad in [r#"na"me"#, "spaced id", "id\n", "æble"] {
            let err = submit_answer(&store, "s1", bad, &serde_json::json!("x"))
                .await
                .unwrap_err();
            assert!(
                matches!(err, Error::Validation(ValidationError::InvalidQuestionId { .. })),
                "expected rejection for {bad:?}"
            );
        }
    }

    #[tokio::test]
    async fn rejects_overlong_id() {
        let store = test_store().await;
        let long = "q".repeat(129);
        let err = submit_answer(&store, "s1", &long, &serde_json::json!("x"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidQuestionId { .. })
        ));
    }

    #[tokio::test]
    async fn rejected_submission_creates_no_session() {
        let store = test_store().await;
        submit_answer(&store, "s1", "", &serde_json::json!("x"))
            .await
            .unwrap_err();
        assert!(store.find_by_session_id("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn false_and_zero_are_valid_values() {
        // Only null is rejected; falsy JSON values are real answers.
        let store = test_store().await;
        let session = submit_answer(&store, "s1", "consent", &serde_json::json!(false))
            .await
            .unwrap();
        assert_eq!(session.answers["consent"], false);

        let session = submit_answer(&store, "s1", "children_count", &serde_json::json!(0))
            .await
            .unwrap();
        assert_eq!(session.answers["children_count"], 0);
    }
}
