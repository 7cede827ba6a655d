use crate::error::ApiResult;
use crate::server::AppState;
use axum::extract::{Path, State};
use axum::Json;
use colloquy_core::{ColloquyError, Role, SummaryRecord, SurveyKind};
use colloquy_driver::{classify, covered_topics};
use colloquy_session::SessionEntry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// `POST /api/{survey}/start` request body.
#[derive(Debug, Deserialize)]
pub struct StartRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Session token plus the greeting.
#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub session_id: Uuid,
    pub message: String,
}

/// `POST /api/{survey}/message` request body.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// The bot reply plus the shared classifier's verdict, so front ends don't
/// scrape the reply text themselves.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
    pub summary_detected: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub topics_covered: Vec<String>,
}

/// `POST /api/{survey}/summary` request body.
#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}

/// The generated summary, verbatim.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// `POST /api/{survey}/complete` request body.
#[derive(Debug, Deserialize)]
pub struct CompleteRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub user_edits: Option<String>,
}

/// Unknown survey prefixes 404 like any unknown route would.
pub(crate) fn kind_for_route(survey: &str) -> Result<SurveyKind, ColloquyError> {
    survey
        .parse()
        .map_err(|_| ColloquyError::NotFound(format!("Unknown survey: {survey}")))
}

fn require(field: Option<String>, message: &str) -> Result<String, ColloquyError> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ColloquyError::Validation(message.to_string())),
    }
}

/// Looks up a session token for one survey kind. Any mismatch — bad token,
/// unknown id, wrong survey — reads as the same 404.
pub(crate) async fn resolve_session(
    state: &AppState,
    kind: SurveyKind,
    raw_id: &str,
) -> Result<(Uuid, SessionEntry), ColloquyError> {
    let not_found = || ColloquyError::NotFound("Session not found".to_string());
    let id = Uuid::parse_str(raw_id).map_err(|_| not_found())?;
    let entry = state.registry.resolve(id).await.ok_or_else(not_found)?;
    if entry.transcript.survey != kind {
        return Err(not_found());
    }
    Ok((id, entry))
}

/// Starts a session: creates the transcript, registers the token, and
/// appends the greeting as the first assistant turn.
pub async fn start(
    Path(survey): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<StartRequest>,
) -> ApiResult<Json<StartResponse>> {
    let kind = kind_for_route(&survey)?;
    let name = require(body.name, "Name and email required")?;
    let email = require(body.email, "Name and email required")?;
    let plan = state.plan(kind)?;

    let (fileref, record) = state.store.create(&name, &email, kind).await?;
    state
        .registry
        .bind(record.session_id, SessionEntry::new(fileref.clone()))
        .await;

    let greeting = plan.render_greeting(&name);
    state
        .store
        .append(&fileref, Role::Assistant, &greeting)
        .await?;

    info!(survey = %kind, session_id = %record.session_id, "session started");
    Ok(Json(StartResponse {
        session_id: record.session_id,
        message: greeting,
    }))
}

/// One exchange: persist the user turn, generate the reply, persist it, and
/// report the classifier verdict.
pub async fn message(
    Path(survey): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<MessageRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let kind = kind_for_route(&survey)?;
    let raw_id = require(body.session_id, "Session ID and message required")?;
    let text = require(body.message, "Session ID and message required")?;
    let plan = state.plan(kind)?;

    let (id, entry) = resolve_session(&state, kind, &raw_id).await?;
    let _guard = state.locks.acquire(id).await;

    let record = state
        .store
        .append(&entry.transcript, Role::User, &text)
        .await?;
    // History as it stood before this turn; the driver appends the user
    // message itself.
    let prior = &record.conversation[..record.conversation.len() - 1];
    let reply = state.driver.next_reply(plan, prior, &text).await?;
    let updated = state
        .store
        .append(&entry.transcript, Role::Assistant, &reply)
        .await?;

    let verdict = classify(plan, &reply);
    let topics_covered = covered_topics(plan, &updated.conversation);

    Ok(Json(MessageResponse {
        message: reply,
        summary_detected: verdict.is_summary,
        topics_covered,
    }))
}

/// Generates the structured summary for review. Nothing is persisted; the
/// confirmed summary arrives with `complete`.
pub async fn summary(
    Path(survey): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<SummaryRequest>,
) -> ApiResult<Json<SummaryResponse>> {
    let kind = kind_for_route(&survey)?;
    let raw_id = require(body.session_id, "Session ID required")?;
    let plan = state.plan(kind)?;

    let (id, entry) = resolve_session(&state, kind, &raw_id).await?;
    let _guard = state.locks.acquire(id).await;

    let record = state.store.read(&entry.transcript).await?;
    let summary = state.driver.summarize(plan, &record.conversation).await?;

    Ok(Json(SummaryResponse { summary }))
}

/// Marks the session completed with the confirmed summary and releases the
/// registry entry.
pub async fn complete(
    Path(survey): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CompleteRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let kind = kind_for_route(&survey)?;
    let raw_id = require(body.session_id, "Session ID required")?;

    let (id, entry) = resolve_session(&state, kind, &raw_id).await?;
    let _guard = state.locks.acquire(id).await;

    let summary_text = body.summary.unwrap_or_default();
    state
        .store
        .complete(
            &entry.transcript,
            SummaryRecord {
                initial: summary_text.clone(),
                confirmed: summary_text,
                user_edits: body.user_edits,
            },
        )
        .await?;

    state.registry.release(id).await;
    state.locks.discard(id);
    info!(survey = %kind, session_id = %id, "session completed");

    Ok(Json(serde_json::json!({ "success": true })))
}
