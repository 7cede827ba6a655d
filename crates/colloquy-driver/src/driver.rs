use crate::backend::TextGenerator;
use crate::classify;
use crate::config::GenerationConfig;
use crate::plan::SurveyPlan;
use crate::ClaudeBackend;
use colloquy_core::{ColloquyError, ColloquyResult, Message, Role, TranscriptRecord};
use tracing::{debug, info};

/// One completed session's contribution to an aggregate analysis.
#[derive(Debug, Clone)]
pub struct SessionDigest {
    /// Participant display name.
    pub participant: String,
    /// The confirmed summary (or the initial one when no confirmation
    /// happened before completion).
    pub summary: String,
}

/// The conversation driver: replays a session's history against the plan's
/// prompts and returns the generated text verbatim.
///
/// One driver instance serves every survey variant; the plan argument carries
/// everything variant-specific.
pub struct SurveyDriver {
    backend: Box<dyn TextGenerator>,
}

impl SurveyDriver {
    /// Creates a driver over the Claude messages endpoint.
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            backend: Box::new(ClaudeBackend::new(config)),
        }
    }

    /// Creates a driver over a pre-built backend (tests, other providers).
    pub fn from_backend(backend: Box<dyn TextGenerator>) -> Self {
        Self { backend }
    }

    /// Produces the bot reply for one user message.
    ///
    /// The system prompt is the plan's base prompt, extended with the current
    /// section's guidance (sectioned surveys pick by message count) and, when
    /// the participant's recent turns read as disengaged, a directive to
    /// pivot to a fresh topic.
    pub async fn next_reply(
        &self,
        plan: &SurveyPlan,
        history: &[Message],
        user_message: &str,
    ) -> ColloquyResult<String> {
        let mut system = plan.base_prompt.clone();

        if let Some(section) = plan.section_for(history.len()) {
            debug!(survey = %plan.kind, section = %section.title, "section selected");
            system.push_str(&format!(
                "\n\nCURRENT SECTION: {}\n{}",
                section.title, section.guidance
            ));
        }

        if !plan.topics.is_empty() && classify::is_stalled(history) {
            system.push_str(
                "\n\nThe participant's recent answers are brief or noncommittal. \
                 Acknowledge briefly and move to a topic you have not covered yet. \
                 Do not ask another follow-up on the current theme.",
            );
        }

        let mut messages = replayable(history);
        messages.push(Message::user(user_message));

        info!(
            survey = %plan.kind,
            history_len = history.len(),
            "requesting reply"
        );
        self.backend
            .generate(Some(&system), &messages, plan.reply_max_tokens)
            .await
    }

    /// Generates the structured end-of-session summary by appending the
    /// plan's fixed instruction as a final user turn.
    pub async fn summarize(
        &self,
        plan: &SurveyPlan,
        history: &[Message],
    ) -> ColloquyResult<String> {
        let mut messages = replayable(history);
        messages.push(Message::user(plan.summary_instruction.as_str()));

        info!(survey = %plan.kind, history_len = history.len(), "requesting summary");
        self.backend
            .generate(None, &messages, plan.summary_max_tokens)
            .await
    }

    /// Generates an aggregate analysis over completed sessions.
    pub async fn analyze(
        &self,
        plan: &SurveyPlan,
        sessions: &[SessionDigest],
    ) -> ColloquyResult<String> {
        let preamble = plan
            .analysis_preamble
            .replace("{{count}}", &sessions.len().to_string());

        let mut prompt = String::from(preamble);
        prompt.push_str("\n\nDATA PROVIDED:\n");
        for (i, session) in sessions.iter().enumerate() {
            prompt.push_str(&format!(
                "\nSESSION {} - {}\nSUMMARY:\n{}\n---\n",
                i + 1,
                session.participant,
                session.summary
            ));
        }
        prompt.push_str("\nGenerate the complete analysis now:");

        info!(survey = %plan.kind, sessions = sessions.len(), "requesting analysis");
        self.backend
            .generate(None, &[Message::user(prompt)], plan.analysis_max_tokens)
            .await
    }

    /// Generates a per-participant course report from one completed record.
    /// `Validation` error when the plan does not support course reports.
    pub async fn course_report(
        &self,
        plan: &SurveyPlan,
        record: &TranscriptRecord,
    ) -> ColloquyResult<String> {
        let instruction = plan.course_report_instruction.as_deref().ok_or_else(|| {
            ColloquyError::Validation(format!(
                "Course reports are not available for {} surveys",
                plan.kind
            ))
        })?;

        let summary = record
            .summary
            .as_ref()
            .map(|s| s.confirmed.as_str())
            .unwrap_or("(no summary)");

        let mut prompt = String::from(instruction);
        prompt.push_str(&format!(
            "\n\nPARTICIPANT: {}\n\nCONFIRMED SUMMARY:\n{}\n\nFULL CONVERSATION:\n",
            record.participant.name, summary
        ));
        for msg in &record.conversation {
            let speaker = match msg.role {
                Role::User => "Participant",
                Role::Assistant => "Interviewer",
            };
            prompt.push_str(&format!("{speaker}: {}\n", msg.content));
        }

        info!(survey = %plan.kind, participant = %record.participant.name, "requesting course report");
        self.backend
            .generate(None, &[Message::user(prompt)], plan.analysis_max_tokens)
            .await
    }
}

/// The history as replayed to the generation API. The greeting is written by
/// the server before any user turn exists, and the API requires the first
/// turn to be user-authored, so a leading assistant message is dropped.
fn replayable(history: &[Message]) -> Vec<Message> {
    let skip = usize::from(matches!(history.first(), Some(m) if m.role == Role::Assistant));
    history[skip..].to_vec()
}
