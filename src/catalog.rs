//! Question catalog — the ordered, static list of onboarding questions.
//!
//! Loaded from a JSON file once at startup and shared read-only for the
//! process lifetime. Catalog order is authoritative for the whole flow:
//! progress, the next question, and completion are all derived from it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// A single onboarding question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Stable identifier, also the key the answer is stored under.
    pub id: String,
    /// The question as shown to the user when no personalization runs.
    pub text: String,
    /// Fixed answer choices. Empty means free-text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// The ordered onboarding question catalog. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionCatalog {
    questions: Vec<Question>,
}

impl QuestionCatalog {
    /// Build a catalog from an already-ordered list of questions.
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Load the catalog from a JSON file of shape
    /// `{"questions": [{"id", "text", "options"?}, ...]}`.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CatalogError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => {
                return Err(CatalogError::Io {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        let document: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        let questions = match document.get("questions") {
            Some(value @ serde_json::Value::Array(_)) => value.clone(),
            _ => return Err(CatalogError::MissingQuestions),
        };

        let questions: Vec<Question> = serde_json::from_value(questions)
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        Ok(Self { questions })
    }

    /// Questions in catalog order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Number of questions in the catalog.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Look up a question by id.
    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// 1-based ordinal position of a question id, if present.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.questions.iter().position(|q| q.id == id).map(|i| i + 1)
    }
}
