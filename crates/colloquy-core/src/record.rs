use crate::{ColloquyError, Message, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The survey variant a session belongs to.
///
/// The kind selects which prompt plan applies and which storage subfolder the
/// transcript file lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurveyKind {
    /// Workshop follow-up feedback interview.
    Workshop,
    /// Faculty AI adoption survey (six structured sections).
    Faculty,
    /// Course-redesign exploration survey.
    Adoption,
    /// Creative Curriculum Chatbot — the login/resume-capable variant.
    C3,
}

impl SurveyKind {
    /// All known survey kinds, in storage order.
    pub const ALL: [SurveyKind; 4] = [
        SurveyKind::Workshop,
        SurveyKind::Faculty,
        SurveyKind::Adoption,
        SurveyKind::C3,
    ];

    /// The storage subfolder / URL segment for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            SurveyKind::Workshop => "workshop",
            SurveyKind::Faculty => "faculty",
            SurveyKind::Adoption => "adoption",
            SurveyKind::C3 => "c3",
        }
    }
}

impl fmt::Display for SurveyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SurveyKind {
    type Err = ColloquyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "workshop" => Ok(SurveyKind::Workshop),
            "faculty" => Ok(SurveyKind::Faculty),
            "adoption" => Ok(SurveyKind::Adoption),
            "c3" => Ok(SurveyKind::C3),
            other => Err(ColloquyError::Validation(format!(
                "Invalid survey type: {other}"
            ))),
        }
    }
}

/// Lifecycle state of a survey session. Monotonic: a record moves from
/// in-progress to completed exactly once and is never reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// The participant has not yet confirmed a summary.
    #[serde(rename = "in-progress")]
    InProgress,
    /// The session finished with a confirmed summary.
    #[serde(rename = "completed")]
    Completed,
}

/// Who the transcript belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    /// Display name, interpolated into the greeting.
    pub name: String,
    /// Email address; also the basis for the transcript filename.
    pub email: String,
    /// When the session was created.
    pub start_time: DateTime<Utc>,
    /// SHA-256 hex digest of the participant's password. Only present in the
    /// login/resume-capable variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
}

/// The confirmed summary attached to a completed session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// The summary text as first generated.
    pub initial: String,
    /// The summary the participant confirmed (currently always equals
    /// `initial`; edits are carried separately).
    pub confirmed: String,
    /// Free-text corrections the participant supplied at review time.
    pub user_edits: Option<String>,
}

/// One participant attempt: the full conversation plus metadata, persisted as
/// a single JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptRecord {
    /// Opaque session token; valid only for the lifetime of the process.
    pub session_id: Uuid,
    /// Which survey variant this session belongs to.
    pub survey: SurveyKind,
    /// Lifecycle state.
    pub status: SessionStatus,
    /// Participant identity and start timestamp.
    pub participant: Participant,
    /// Append-only ordered conversation history.
    pub conversation: Vec<Message>,
    /// Present once the session completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryRecord>,
    /// Cached per-participant course report (adoption variant).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_report: Option<String>,
    /// When the cached course report was generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_report_generated: Option<DateTime<Utc>>,
    /// When the session completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_time: Option<DateTime<Utc>>,
    /// Touched on every write.
    pub last_updated: DateTime<Utc>,
}

impl TranscriptRecord {
    /// Creates a fresh in-progress record with an empty conversation.
    pub fn new(name: impl Into<String>, email: impl Into<String>, survey: SurveyKind) -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::new_v4(),
            survey,
            status: SessionStatus::InProgress,
            participant: Participant {
                name: name.into(),
                email: email.into(),
                start_time: now,
                password_hash: None,
            },
            conversation: Vec::new(),
            summary: None,
            course_report: None,
            course_report_generated: None,
            completed_time: None,
            last_updated: now,
        }
    }

    /// Appends one turn and touches `last_updated`.
    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.conversation.push(Message::new(role, content));
        self.last_updated = Utc::now();
    }

    /// Marks the record completed with the given summary. Repeated calls
    /// overwrite the summary silently; there is no historical versioning.
    pub fn complete(&mut self, summary: SummaryRecord) {
        let now = Utc::now();
        self.status = SessionStatus::Completed;
        self.summary = Some(summary);
        self.completed_time = Some(now);
        self.last_updated = now;
    }

    /// Number of turns recorded so far.
    pub fn message_count(&self) -> usize {
        self.conversation.len()
    }
}

/// Locates a transcript file: storage subfolder plus filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptRef {
    /// The survey kind, which selects the subfolder.
    pub survey: SurveyKind,
    /// Filename within the subfolder, derived from the participant email.
    pub filename: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_survey_kind_round_trip() {
        for kind in SurveyKind::ALL {
            let parsed: SurveyKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert!("bogus".parse::<SurveyKind>().is_err());
    }

    #[test]
    fn test_status_wire_form() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(
            serde_json::to_string(&SessionStatus::Completed).unwrap(),
            "\"completed\""
        );
    }

    #[test]
    fn test_record_lifecycle() {
        let mut record = TranscriptRecord::new("Ada", "ada@x.edu", SurveyKind::Workshop);
        assert_eq!(record.status, SessionStatus::InProgress);
        assert_eq!(record.message_count(), 0);
        assert!(record.summary.is_none());

        record.push(Role::Assistant, "Hi Ada!");
        record.push(Role::User, "Hello");
        assert_eq!(record.message_count(), 2);
        assert_eq!(record.conversation[0].content, "Hi Ada!");

        record.complete(SummaryRecord {
            initial: "summary".into(),
            confirmed: "summary".into(),
            user_edits: None,
        });
        assert_eq!(record.status, SessionStatus::Completed);
        assert!(record.completed_time.is_some());
        assert!(record.summary.is_some());
    }

    #[test]
    fn test_record_serialization_omits_empty_optionals() {
        let record = TranscriptRecord::new("Ada", "ada@x.edu", SurveyKind::Faculty);
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("summary").is_none());
        assert!(json.get("course_report").is_none());
        assert!(json.get("completed_time").is_none());
        assert_eq!(json["survey"], "faculty");
        assert_eq!(json["status"], "in-progress");
    }

    #[test]
    fn test_participant_password_hash_not_serialized_when_absent() {
        let record = TranscriptRecord::new("Ada", "ada@x.edu", SurveyKind::Workshop);
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["participant"].get("password_hash").is_none());
    }
}
