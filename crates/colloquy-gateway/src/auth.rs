use crate::error::ApiResult;
use crate::server::AppState;
use crate::survey::kind_for_route;
use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use colloquy_core::{ColloquyError, Message, Role};
use colloquy_session::SessionEntry;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// `POST /api/{survey}/signup` request body.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// `POST /api/{survey}/login` request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Login outcome: either a fresh greeting or the conversation to resume.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub session_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conversation: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
}

/// SHA-256 hex digest of a participant password.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn require(field: Option<String>, message: &str) -> Result<String, ColloquyError> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ColloquyError::Validation(message.to_string())),
    }
}

fn login_capable(state: &AppState, survey: &str) -> Result<colloquy_core::SurveyKind, ColloquyError> {
    let kind = kind_for_route(survey)?;
    let plan = state.plan(kind)?;
    if !plan.supports_login {
        return Err(ColloquyError::NotFound(format!(
            "Unknown survey: {survey}"
        )));
    }
    Ok(kind)
}

/// Creates an account-backed session: like `start`, plus a stored password
/// hash so the participant can pause and resume later.
pub async fn signup(
    Path(survey): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<SignupRequest>,
) -> ApiResult<Json<crate::survey::StartResponse>> {
    let kind = login_capable(&state, &survey)?;
    let name = require(body.name, "Name, email, and password required")?;
    let email = require(body.email, "Name, email, and password required")?;
    let password = require(body.password, "Name, email, and password required")?;
    let plan = state.plan(kind)?;

    let (fileref, record) = state.store.create(&name, &email, kind).await?;
    state
        .store
        .set_password_hash(&fileref, &hash_password(&password))
        .await?;
    state
        .registry
        .bind(record.session_id, SessionEntry::new(fileref.clone()))
        .await;

    let greeting = plan.render_greeting(&name);
    state
        .store
        .append(&fileref, Role::Assistant, &greeting)
        .await?;

    info!(survey = %kind, session_id = %record.session_id, "signup");
    Ok(Json(crate::survey::StartResponse {
        session_id: record.session_id,
        message: greeting,
    }))
}

/// Resumes the newest in-progress session for the email. The mapping is
/// re-derived from the stored transcript, so it survives server restarts.
pub async fn login(
    Path(survey): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let kind = login_capable(&state, &survey)?;
    let email = require(body.email, "Email and password required")?;
    let password = require(body.password, "Email and password required")?;

    let (fileref, record) = state
        .store
        .find_resumable(kind, &email)
        .await?
        .ok_or_else(|| ColloquyError::NotFound("No conversation found for this email".into()))?;

    let stored = record
        .participant
        .password_hash
        .as_deref()
        .ok_or(ColloquyError::Unauthorized)?;
    if !crate::middleware::validate_token(stored, &hash_password(&password)) {
        return Err(ColloquyError::Unauthorized.into());
    }

    state
        .registry
        .bind(record.session_id, SessionEntry::new(fileref))
        .await;
    info!(survey = %kind, session_id = %record.session_id, "login resume");

    Ok(Json(LoginResponse {
        session_id: record.session_id,
        message: None,
        start_time: Some(record.participant.start_time),
        conversation: record.conversation,
    }))
}
