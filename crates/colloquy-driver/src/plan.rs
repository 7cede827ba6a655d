use colloquy_core::SurveyKind;
use serde::{Deserialize, Serialize};

/// Everything that distinguishes one survey variant from another.
///
/// Plans are plain data: the built-in catalog constructs them in code, and a
/// deployment can override individual plans from TOML without touching the
/// driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyPlan {
    /// Which variant this plan drives.
    pub kind: SurveyKind,
    /// Human-readable survey title.
    pub title: String,
    /// Greeting template; `{{name}}` is replaced with the participant name.
    pub greeting: String,
    /// The base system prompt sent on every exchange.
    pub base_prompt: String,
    /// Ordered section schedule. Empty for single-prompt surveys.
    #[serde(default)]
    pub sections: Vec<SectionRule>,
    /// The fixed summary instruction appended as a user turn.
    pub summary_instruction: String,
    /// Heading the generated summary is expected to open with.
    pub summary_heading: String,
    /// The trailing confirmation question the summary must end with; the
    /// classifier keys on it.
    pub confirmation_question: String,
    /// Topics tracked by keyword coverage. Empty for most variants.
    #[serde(default)]
    pub topics: Vec<TopicSpec>,
    /// Preamble for the aggregate analysis prompt; `{{count}}` is replaced
    /// with the number of completed sessions.
    pub analysis_preamble: String,
    /// Instruction for per-participant course reports, when supported.
    #[serde(default)]
    pub course_report_instruction: Option<String>,
    /// Whether this variant supports password signup/login and resume.
    #[serde(default)]
    pub supports_login: bool,
    /// Token budget for conversational replies.
    #[serde(default = "default_reply_tokens")]
    pub reply_max_tokens: u32,
    /// Token budget for summary generation.
    #[serde(default = "default_summary_tokens")]
    pub summary_max_tokens: u32,
    /// Token budget for aggregate analysis and course reports.
    #[serde(default = "default_analysis_tokens")]
    pub analysis_max_tokens: u32,
}

fn default_reply_tokens() -> u32 {
    2000
}
fn default_summary_tokens() -> u32 {
    1500
}
fn default_analysis_tokens() -> u32 {
    4000
}

impl SurveyPlan {
    /// Renders the greeting for a participant.
    pub fn render_greeting(&self, name: &str) -> String {
        self.greeting.replace("{{name}}", name)
    }

    /// Picks the section for the current history length: the first section
    /// whose ceiling has not been reached, else the final (unbounded) one.
    /// `None` for single-prompt surveys.
    pub fn section_for(&self, history_len: usize) -> Option<&SectionRule> {
        if self.sections.is_empty() {
            return None;
        }
        self.sections
            .iter()
            .find(|s| s.upto.map_or(true, |ceiling| history_len < ceiling as usize))
            .or(self.sections.last())
    }
}

/// One phase of a sectioned survey, selected by message count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionRule {
    /// Section title shown to the model.
    pub title: String,
    /// Message-count ceiling: the section applies while the history is
    /// shorter than this. `None` marks the final section.
    #[serde(default)]
    pub upto: Option<u32>,
    /// Section-specific guidance appended to the base prompt, typically the
    /// questions to ask one at a time.
    pub guidance: String,
}

/// A topic tracked by keyword coverage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicSpec {
    /// Stable topic key reported to clients.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Case-insensitive keywords; any hit marks the topic covered.
    pub keywords: Vec<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sectioned_plan() -> SurveyPlan {
        SurveyPlan {
            kind: SurveyKind::Faculty,
            title: "t".into(),
            greeting: "Hi {{name}}!".into(),
            base_prompt: "base".into(),
            sections: vec![
                SectionRule {
                    title: "one".into(),
                    upto: Some(4),
                    guidance: String::new(),
                },
                SectionRule {
                    title: "two".into(),
                    upto: Some(8),
                    guidance: String::new(),
                },
                SectionRule {
                    title: "final".into(),
                    upto: None,
                    guidance: String::new(),
                },
            ],
            summary_instruction: String::new(),
            summary_heading: String::new(),
            confirmation_question: String::new(),
            topics: vec![],
            analysis_preamble: String::new(),
            course_report_instruction: None,
            supports_login: false,
            reply_max_tokens: 2000,
            summary_max_tokens: 1500,
            analysis_max_tokens: 4000,
        }
    }

    #[test]
    fn greeting_interpolates_name() {
        assert_eq!(sectioned_plan().render_greeting("Ada"), "Hi Ada!");
    }

    #[test]
    fn section_selection_honors_ceilings_at_boundaries() {
        let plan = sectioned_plan();
        assert_eq!(plan.section_for(0).unwrap().title, "one");
        assert_eq!(plan.section_for(3).unwrap().title, "one");
        assert_eq!(plan.section_for(4).unwrap().title, "two");
        assert_eq!(plan.section_for(7).unwrap().title, "two");
        assert_eq!(plan.section_for(8).unwrap().title, "final");
        assert_eq!(plan.section_for(100).unwrap().title, "final");
    }

    #[test]
    fn empty_sections_mean_single_prompt() {
        let mut plan = sectioned_plan();
        plan.sections.clear();
        assert!(plan.section_for(10).is_none());
    }

    #[test]
    fn plan_deserializes_from_toml_with_defaults() {
        let plan: SurveyPlan = toml::from_str(
            r#"
            kind = "workshop"
            title = "Workshop Feedback"
            greeting = "Hi {{name}}!"
            base_prompt = "You are an interviewer."
            summary_instruction = "Summarize."
            summary_heading = "PARTICIPANT SUMMARY"
            confirmation_question = "Does this accurately capture your thoughts?"
            analysis_preamble = "Analyze {{count}} interviews."
            "#,
        )
        .unwrap();
        assert_eq!(plan.kind, SurveyKind::Workshop);
        assert!(plan.sections.is_empty());
        assert!(!plan.supports_login);
        assert_eq!(plan.reply_max_tokens, 2000);
        assert_eq!(plan.summary_max_tokens, 1500);
    }
}
