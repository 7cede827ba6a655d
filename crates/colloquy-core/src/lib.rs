//! Core types and error definitions for the Colloquy survey platform.
//!
//! This crate provides the foundational types shared across all Colloquy
//! crates: error handling, conversation message representations, and the
//! persisted transcript record schema.
//!
//! # Main types
//!
//! - [`ColloquyError`] — Unified error enum for all Colloquy subsystems.
//! - [`ColloquyResult`] — Convenience alias for `Result<T, ColloquyError>`.
//! - [`Role`] — Message role (user, assistant).
//! - [`Message`] — A single turn within a survey conversation.
//! - [`record`] — The on-disk transcript record schema.

/// Persisted transcript record schema.
pub mod record;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use record::{
    Participant, SessionStatus, SummaryRecord, SurveyKind, TranscriptRecord, TranscriptRef,
};

// --- Error types ---

/// Top-level error type for the Colloquy platform.
///
/// Variants map onto the HTTP error taxonomy at the gateway: validation
/// errors become 400, not-found 404, unauthorized 401, and everything else a
/// generic 500.
#[derive(Debug, thiserror::Error)]
pub enum ColloquyError {
    /// A request was missing required fields or carried invalid values.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A session, transcript file, or report could not be found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or invalid credentials (admin token, participant password).
    #[error("Unauthorized")]
    Unauthorized,

    /// A transcript file exists but its content is not a valid record.
    #[error("Corrupt transcript: {0}")]
    CorruptData(String),

    /// An error related to session registration or lookup.
    #[error("Session error: {0}")]
    Session(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// An error from an outbound HTTP request (the text-generation API).
    #[error("HTTP error: {0}")]
    Http(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`ColloquyError`].
pub type ColloquyResult<T> = Result<T, ColloquyError>;

// --- Message types ---

/// The role of the participant that authored a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A human survey participant.
    User,
    /// The interviewing assistant.
    Assistant,
}

/// A single turn within a survey conversation.
///
/// The conversation sequence in a transcript is append-only: turns are never
/// reordered or edited, and the full ordered history is replayed to the
/// generation API on every exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// The role of the turn's author.
    pub role: Role,
    /// The textual content of the turn.
    pub content: String,
    /// UTC timestamp of when the turn was recorded.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Creates a new message with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a new message with [`Role::User`].
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates a new message with [`Role::Assistant`].
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}
