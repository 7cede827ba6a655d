//! Shared text heuristics: summary detection, topic coverage, and
//! disengagement.
//!
//! The summary check replaces the per-variant front-end scraping with one
//! server-side classifier. It stays heuristic by nature — generated text
//! varies — so false negatives and positives are possible and accepted.

use crate::plan::SurveyPlan;
use colloquy_core::{Message, Role};
use regex::Regex;
use std::sync::LazyLock;

/// Revision of the summary heuristic. Bump when the rules change so stored
/// verdicts can be told apart.
pub const CLASSIFIER_VERSION: u32 = 2;

/// Bold markdown section headers like `**AI Awareness & Usage:**`.
#[allow(clippy::expect_used)]
static BOLD_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*[A-Z][^*]+:\*\*").expect("static regex"));

/// Outcome of running the summary classifier over one bot reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryVerdict {
    /// The reply has the structure of a complete summary.
    pub is_summary: bool,
    /// The reply ends with the confirmation question.
    pub has_confirmation: bool,
}

/// Classifies one bot reply: a summary needs either three bold section
/// headers or the plan's summary heading, plus the trailing confirmation
/// question ("does this" + "capture"/"accurate").
pub fn classify(plan: &SurveyPlan, text: &str) -> SummaryVerdict {
    let lower = text.to_lowercase();
    let has_confirmation = lower.contains("does this")
        && (lower.contains("capture") || lower.contains("accurate"));

    let header_count = BOLD_HEADER_RE.find_iter(text).count();
    let has_heading =
        !plan.summary_heading.is_empty() && text.contains(plan.summary_heading.as_str());

    SummaryVerdict {
        is_summary: (header_count >= 3 || has_heading) && has_confirmation,
        has_confirmation,
    }
}

/// Topic keys from the plan whose keywords appear anywhere in the
/// conversation, in plan order. Case-insensitive.
pub fn covered_topics(plan: &SurveyPlan, history: &[Message]) -> Vec<String> {
    if plan.topics.is_empty() {
        return Vec::new();
    }
    let haystack: String = history
        .iter()
        .map(|m| m.content.to_lowercase())
        .collect::<Vec<_>>()
        .join("\n");

    plan.topics
        .iter()
        .filter(|topic| {
            topic
                .keywords
                .iter()
                .any(|kw| haystack.contains(&kw.to_lowercase()))
        })
        .map(|topic| topic.id.clone())
        .collect()
}

const DISENGAGEMENT_PHRASES: [&str; 8] = [
    "i don't know",
    "i dont know",
    "not sure",
    "not really",
    "i'd rather not",
    "next question",
    "move on",
    "skip",
];

fn is_disengaged(content: &str) -> bool {
    let lower = content.trim().to_lowercase();
    if lower.split_whitespace().count() <= 2 {
        return true;
    }
    DISENGAGEMENT_PHRASES.iter().any(|p| lower.contains(p))
}

/// True when the participant's last two turns both read as disengaged —
/// the signal to stop probing and pivot to a fresh topic.
pub fn is_stalled(history: &[Message]) -> bool {
    let mut recent_users = history
        .iter()
        .rev()
        .filter(|m| m.role == Role::User)
        .take(2);

    match (recent_users.next(), recent_users.next()) {
        (Some(a), Some(b)) => is_disengaged(&a.content) && is_disengaged(&b.content),
        _ => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::catalog::PlanCatalog;
    use colloquy_core::SurveyKind;

    fn plan(kind: SurveyKind) -> SurveyPlan {
        PlanCatalog::builtin().get(kind).unwrap().clone()
    }

    #[test]
    fn faculty_summary_phrasing_is_detected() {
        let text = "\
**FACULTY AI SURVEY SUMMARY**

**AI Awareness & Usage:**
- Tools Used: ChatGPT

**Interest in AI for Teaching (1-5 scale):**
- Personalized Learning: 4

**Concerns & Barriers (True/False responses):**
- Data Privacy: T

Does this accurately capture your responses? Anything to add or clarify?";
        let verdict = classify(&plan(SurveyKind::Faculty), text);
        assert!(verdict.is_summary);
        assert!(verdict.has_confirmation);
    }

    #[test]
    fn workshop_summary_with_heading_is_detected() {
        let text = "\
PARTICIPANT SUMMARY

Workshop Feedback:
Found the hands-on session most valuable.

Does this accurately capture your thoughts? Anything to add or clarify?";
        let verdict = classify(&plan(SurveyKind::Workshop), text);
        assert!(verdict.is_summary);
    }

    #[test]
    fn mid_survey_question_is_not_a_summary() {
        let text = "How often do you currently use AI tools?\n\nOptions: Never, Rarely, Monthly, Weekly, Daily";
        let verdict = classify(&plan(SurveyKind::Faculty), text);
        assert!(!verdict.is_summary);
        assert!(!verdict.has_confirmation);
    }

    #[test]
    fn headers_without_confirmation_are_not_a_summary() {
        let text = "**Alpha:** a\n**Beta:** b\n**Gamma:** c\nThanks for your time!";
        let verdict = classify(&plan(SurveyKind::Faculty), text);
        assert!(!verdict.is_summary);
    }

    #[test]
    fn confirmation_alone_is_not_a_summary() {
        let text = "Does this accurately capture your thoughts?";
        let verdict = classify(&plan(SurveyKind::Workshop), text);
        assert!(verdict.has_confirmation);
        assert!(!verdict.is_summary);
    }

    #[test]
    fn covered_topics_matches_keywords_case_insensitively() {
        let c3 = plan(SurveyKind::C3);
        let history = vec![
            Message::assistant("Which course are you thinking about?"),
            Message::user("My intro BIOLOGY course — I worry about one barrier: cost."),
        ];
        let covered = covered_topics(&c3, &history);
        assert!(covered.contains(&"course_specifics".to_string()));
        assert!(covered.contains(&"barriers_challenges".to_string()));
        assert!(!covered.contains(&"exceptional_moments".to_string()));
    }

    #[test]
    fn topics_empty_for_plans_without_topics() {
        let history = vec![Message::user("course barrier support")];
        assert!(covered_topics(&plan(SurveyKind::Workshop), &history).is_empty());
    }

    #[test]
    fn stalled_needs_two_consecutive_disengaged_turns() {
        let engaged = Message::user(
            "I redesigned my capstone around weekly studio critiques and it changed everything",
        );
        let flat_a = Message::user("I don't know");
        let flat_b = Message::user("not sure");

        assert!(is_stalled(&[
            Message::assistant("q1"),
            flat_a.clone(),
            Message::assistant("q2"),
            flat_b.clone(),
        ]));
        assert!(!is_stalled(&[
            Message::assistant("q1"),
            engaged.clone(),
            Message::assistant("q2"),
            flat_b,
        ]));
        assert!(!is_stalled(&[Message::assistant("q1"), flat_a]));
    }

    #[test]
    fn short_answers_count_as_disengaged() {
        assert!(is_disengaged("Maybe"));
        assert!(is_disengaged("we'll see"));
        assert!(!is_disengaged(
            "The pacing felt right and I would attend again"
        ));
    }
}
