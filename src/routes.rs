//! REST endpoints for the onboarding flow.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::warn;
use uuid::Uuid;

use crate::catalog::{Question, QuestionCatalog};
use crate::error::Error;
use crate::flow::{
    self, PriorOnboarding, QuestionPresenter, compute_progress, next_question,
    resolve_session_id,
};
use crate::flow::prompts::{completion_message, summarize_answers};
use crate::session::{AnswerMap, Progress};
use crate::store::SessionStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// `None` when the catalog failed to load — the flow endpoints answer
    /// 503 while `/health` keeps working.
    pub catalog: Option<Arc<QuestionCatalog>>,
    pub store: Arc<dyn SessionStore>,
    pub presenter: Arc<QuestionPresenter>,
    pub language: String,
}

/// Build the Axum router with the onboarding REST routes.
pub fn onboarding_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/onboarding/{session_id}/question", get(get_question))
        .route("/api/onboarding/{session_id}/answers", post(submit_answer))
        .route("/api/onboarding/resolve", post(resolve_session))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Wire types ──────────────────────────────────────────────────────────

/// A question as delivered to the client.
#[derive(Debug, Serialize)]
struct PresentedQuestion {
    id: String,
    /// Personalized phrasing, or the raw catalog text when personalization
    /// is unavailable.
    text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    options: Vec<String>,
}

#[derive(Debug, Serialize)]
struct QuestionResponse {
    completed: bool,
    progress: Progress,
    #[serde(skip_serializing_if = "Option::is_none")]
    question: Option<PresentedQuestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubmitAnswerRequest {
    question_id: String,
    #[serde(default)]
    value: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ResolveSessionRequest {
    user_id: String,
    /// The onboarding session the client was answering under, if any.
    #[serde(default)]
    prior_session_id: Option<String>,
    /// Session id hint for this login; minted server-side when absent.
    #[serde(default)]
    session_hint: Option<String>,
}

#[derive(Debug, Serialize)]
struct ResolveSessionResponse {
    session_id: String,
    /// Whether the id continues a completed onboarding session.
    continued: bool,
}

// ── Handlers ────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "famlink-onboarding"
    }))
}

/// GET /api/onboarding/{session_id}/question
///
/// Read-only: the next unanswered question (personalized when possible),
/// current progress, and the completion flag.
async fn get_question(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let Some(catalog) = state.catalog.clone() else {
        return feature_unavailable();
    };

    let answers = match load_answers(state.store.as_ref(), &session_id).await {
        Ok(answers) => answers,
        Err(e) => return error_response(&e),
    };

    let response = build_question_response(&state, &catalog, &session_id, &answers).await;
    Json(response).into_response()
}

/// POST /api/onboarding/{session_id}/answers
///
/// Mutating: validates and merges one answer, then returns the updated
/// progress and the next question, or the completion message once the
/// catalog is exhausted.
async fn submit_answer(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<SubmitAnswerRequest>,
) -> Response {
    let Some(catalog) = state.catalog.clone() else {
        return feature_unavailable();
    };

    let session = match flow::submit_answer(
        state.store.as_ref(),
        &session_id,
        &request.question_id,
        &request.value,
    )
    .await
    {
        Ok(session) => session,
        Err(e) => return error_response(&e),
    };

    let response =
        build_question_response(&state, &catalog, &session_id, &session.answers).await;
    Json(response).into_response()
}

/// POST /api/onboarding/resolve
///
/// Decides which session id a freshly authenticated user chats under:
/// the hint while onboarding is absent or unfinished, a stable derived id
/// once it is complete. Completing the link also attaches the user to the
/// onboarding session.
async fn resolve_session(
    State(state): State<AppState>,
    Json(request): Json<ResolveSessionRequest>,
) -> Response {
    let Some(catalog) = state.catalog.clone() else {
        return feature_unavailable();
    };

    let hint = request
        .session_hint
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let prior = match &request.prior_session_id {
        Some(prior_id) => {
            match state.store.find_by_session_id(prior_id).await {
                Ok(Some(session)) => {
                    let progress = compute_progress(&catalog, &session.answers);
                    Some(PriorOnboarding {
                        session_id: session.session_id,
                        answered: progress.answered,
                    })
                }
                Ok(None) => None,
                Err(e) => return error_response(&e.into()),
            }
        }
        None => None,
    };

    let resolved = resolve_session_id(&request.user_id, prior.as_ref(), catalog.len(), &hint);
    let continued = resolved != hint;

    if continued {
        if let Some(ref prior) = prior {
            if let Err(e) = state
                .store
                .attach_user(&prior.session_id, &request.user_id)
                .await
            {
                return error_response(&e.into());
            }
        }
    }

    Json(ResolveSessionResponse {
        session_id: resolved,
        continued,
    })
    .into_response()
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Load a session's answers; an unknown session is an empty map, not an
/// error — sessions are created lazily on first submission.
async fn load_answers(
    store: &dyn SessionStore,
    session_id: &str,
) -> Result<AnswerMap, Error> {
    Ok(store
        .find_by_session_id(session_id)
        .await?
        .map(|s| s.answers)
        .unwrap_or_default())
}

async fn build_question_response(
    state: &AppState,
    catalog: &QuestionCatalog,
    session_id: &str,
    answers: &AnswerMap,
) -> QuestionResponse {
    let progress = compute_progress(catalog, answers);

    let Some(question) = next_question(catalog, answers) else {
        return QuestionResponse {
            completed: true,
            progress,
            question: None,
            message: Some(completion_message(&state.language)),
        };
    };

    let presented = present(state, catalog, session_id, question, answers, &progress).await;
    QuestionResponse {
        completed: false,
        progress,
        question: Some(presented),
        message: None,
    }
}

async fn present(
    state: &AppState,
    catalog: &QuestionCatalog,
    session_id: &str,
    question: &Question,
    answers: &AnswerMap,
    progress: &Progress,
) -> PresentedQuestion {
    let prior_summary = summarize_answers(catalog, answers);
    let position = catalog.position(&question.id).unwrap_or(1);
    let text = state
        .presenter
        .present(
            session_id,
            question,
            &prior_summary,
            position,
            progress.total,
            progress.answered == 0,
        )
        .await;

    PresentedQuestion {
        id: question.id.clone(),
        text,
        options: question.options.clone(),
    }
}

fn feature_unavailable() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(serde_json::json!({
            "error": "Onboarding is unavailable: no question catalog is loaded"
        })),
    )
        .into_response()
}

fn error_response(error: &Error) -> Response {
    let status = match error {
        Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::Store(_) | Error::Catalog(_) => StatusCode::SERVICE_UNAVAILABLE,
        Error::Config(_) | Error::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        warn!(error = %error, "Request failed");
    }
    (
        status,
        Json(serde_json::json!({ "error": error.to_string() })),
    )
        .into_response()
}
