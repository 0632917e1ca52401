//! Agent-assisted question presentation.
//!
//! Wraps the next question into a prompt for the text-generation provider.
//! The flow never depends on the provider: any failure — timeout, transport
//! error, empty output, or no provider configured at all — falls back to the
//! raw catalog text.

use std::sync::Arc;
use std::time::Duration;

use crate::catalog::Question;
use crate::error::GenerationError;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};

use super::prompts::{presentation_system_prompt, presentation_user_prompt};

/// Presents questions, personalized when a provider is available.
pub struct QuestionPresenter {
    llm: Option<Arc<dyn LlmProvider>>,
    timeout: Duration,
    language: String,
}

impl QuestionPresenter {
    pub fn new(
        llm: Option<Arc<dyn LlmProvider>>,
        timeout: Duration,
        language: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            timeout,
            language: language.into(),
        }
    }

    /// Present one question for a session.
    ///
    /// `position` is the question's 1-based ordinal, `total` the catalog
    /// size, `prior_summary` a human-readable rendering of earlier answers,
    /// and `is_first` whether this opens the conversation. Returns the
    /// personalized phrasing, or `question.text` verbatim on any failure.
    /// Never errors.
    pub async fn present(
        &self,
        session_id: &str,
        question: &Question,
        prior_summary: &str,
        position: usize,
        total: usize,
        is_first: bool,
    ) -> String {
        let Some(ref llm) = self.llm else {
            return question.text.clone();
        };

        match self
            .generate(llm, session_id, question, prior_summary, position, total, is_first)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    session_id,
                    question_id = %question.id,
                    error = %e,
                    "Question personalization failed, serving raw catalog text"
                );
                question.text.clone()
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn generate(
        &self,
        llm: &Arc<dyn LlmProvider>,
        session_id: &str,
        question: &Question,
        prior_summary: &str,
        position: usize,
        total: usize,
        is_first: bool,
    ) -> Result<String, GenerationError> {
        let messages = vec![
            ChatMessage::system(presentation_system_prompt(
                position,
                total,
                &self.language,
                is_first,
                prior_summary,
            )),
            ChatMessage::user(presentation_user_prompt(question)),
        ];
        let request = CompletionRequest::new(messages)
            .with_max_tokens(512)
            .with_temperature(0.7)
            .with_context_id(session_id);

        let response = tokio::time::timeout(self.timeout, llm.complete(request))
            .await
            .map_err(|_| GenerationError::Timeout {
                timeout: self.timeout,
            })??;

        let text = response.content.trim().to_string();
        if text.is_empty() {
            return Err(GenerationError::InvalidResponse {
                provider: llm.model_name().to_string(),
                reason: "empty presentation text".to_string(),
            });
        }
        Ok(text)
    }
}
