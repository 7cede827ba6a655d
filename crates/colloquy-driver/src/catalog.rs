//! The built-in survey plans.
//!
//! All four variants share one driver; everything variant-specific is data in
//! this module. A deployment can replace any plan from TOML (see the CLI's
//! `surveys` config table) without code changes.

use crate::plan::{SectionRule, SurveyPlan, TopicSpec};
use colloquy_core::SurveyKind;

/// The set of survey plans the server drives.
pub struct PlanCatalog {
    plans: Vec<SurveyPlan>,
}

impl PlanCatalog {
    /// The four built-in plans.
    pub fn builtin() -> Self {
        Self {
            plans: vec![workshop(), faculty(), adoption(), c3()],
        }
    }

    /// Builds a catalog from explicit plans (config overrides, tests).
    pub fn from_plans(plans: Vec<SurveyPlan>) -> Self {
        Self { plans }
    }

    /// Looks up the plan for a survey kind.
    pub fn get(&self, kind: SurveyKind) -> Option<&SurveyPlan> {
        self.plans.iter().find(|p| p.kind == kind)
    }

    /// All plans, in registration order.
    pub fn plans(&self) -> &[SurveyPlan] {
        &self.plans
    }

    /// Replaces the plan for a kind, or appends it if absent.
    pub fn upsert(&mut self, plan: SurveyPlan) {
        match self.plans.iter_mut().find(|p| p.kind == plan.kind) {
            Some(slot) => *slot = plan,
            None => self.plans.push(plan),
        }
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

const CONFIRMATION: &str =
    "Does this accurately capture your thoughts? Anything to add or clarify?";

fn workshop() -> SurveyPlan {
    SurveyPlan {
        kind: SurveyKind::Workshop,
        title: "AI Workshop Feedback".into(),
        greeting: "Hi {{name}}! Thanks for attending the VizLab AI Workshop. I'm a \
                   conversational feedback tool — instead of a form, we'll just talk for \
                   5-10 minutes about what worked, what didn't, and where you'd like to go \
                   next with AI in your teaching.\n\nTo start: what stood out to you most \
                   from the workshop?"
            .into(),
        base_prompt: "\
You are a conversational feedback tool conducting follow-up interviews with participants \
from the VizLab AI Workshop at St. Cloud State University.

YOUR ROLE:
- You conduct natural, exploratory conversations - more engaging than traditional surveys
- Ask one question at a time and let participants elaborate as much as they want
- Your role is to understand and explore - NOT to advise, solve, or prescribe
- Any response length is valid - they can say \"I don't know\" or \"I'd rather not say\"

RECOGNIZE DISENGAGEMENT AND MOVE ON:
When you see \"I don't know\", deflection, or very brief answers, acknowledge briefly \
and immediately move to a different topic. Do not ask another follow-up on the same \
theme. Only ask follow-ups (max 1-2) when the participant gives detailed, specific \
answers or introduces new ideas unprompted.

CORE TOPICS TO COVER:
1. Overall impressions of the workshop
2. Interest in the DGX workstation, the policy board, and the adoption clinic
3. Concerns and support needs around AI in teaching
4. Technical comfort level
5. Course redesign ideas
6. How this conversational format compares to a traditional survey

BOUNDARIES:
- If asked for advice, redirect: you are here to understand their perspective; the \
NextEd team will use these conversations to shape how they support faculty.
- Be transparent about being an AI prototype if asked how you work.

TIME MANAGEMENT:
- Aim for 5-10 minute conversations (roughly 8-12 exchanges); prioritize breadth over depth.
- After 10+ exchanges, start wrapping toward the summary.

ENDING:
When you've covered most topics, say you have a good sense of their perspective, \
generate the structured summary, and end it with exactly: \"Does this accurately \
capture your thoughts? Anything to add or clarify?\" Do not thank them or end the \
session before they confirm the summary."
            .into(),
        sections: vec![],
        summary_instruction: "\
Based on the conversation above, generate a structured summary using this exact format:

PARTICIPANT SUMMARY

Workshop Feedback:
[2-3 sentences capturing their main impressions and what resonated or didn't]

NextEd Interest:
- DGX Workstation: [Yes/No/Maybe, or \"Not discussed\"]
- Policy Board: [Yes/No/Maybe, or \"Not discussed\"]
- Adoption Clinic: [Yes/No/Maybe - include course ideas if mentioned, or \"Not discussed\"]

AI Concerns & Support Needs:
[Bullet points covering concerns, barriers, and what support would help; \
\"None expressed\" if none]

Technical Comfort Level:
[Brief assessment, or \"Not discussed\"]

Course Ideas:
[Specific course redesign concepts they mentioned, or \"Not discussed\"]

Survey Experience:
[Their thoughts on this conversational approach vs. traditional surveys, or \"Not discussed\"]

Recommended Follow-up:
[1-2 specific next steps, or \"General NextEd outreach\"]

Keep it concise but capture important details. Use \"Not discussed\" for topics they \
didn't address.

CRITICAL: After presenting the summary, you MUST end with: \"Does this accurately \
capture your thoughts? Anything to add or clarify?\""
            .into(),
        summary_heading: "PARTICIPANT SUMMARY".into(),
        confirmation_question: CONFIRMATION.into(),
        topics: vec![],
        analysis_preamble: "\
You are analyzing feedback from a workshop about AI adoption in education. You have \
{{count}} completed conversational interviews.

Generate a comprehensive analysis report with: (1) quantitative findings a traditional \
survey would capture (participation, interest levels, concern frequencies, comfort \
levels, as tables and percentages); (2) qualitative insights the conversations reveal \
that surveys miss (the why behind the numbers, specific use cases, contradictions, \
representative quotes attributed by name); (3) a side-by-side comparison of what a \
traditional survey would show versus what the conversational method revealed; \
(4) strategic recommendations sequenced as immediate / 3-6 months / 6-12 months, each \
citing the insight that supports it; (5) a participant profile table for follow-up. \
Keep the executive summary under 200 words."
            .into(),
        course_report_instruction: None,
        supports_login: false,
        reply_max_tokens: 2000,
        summary_max_tokens: 1500,
        analysis_max_tokens: 4000,
    }
}

fn faculty() -> SurveyPlan {
    let base_prompt = "\
You are conducting a hybrid AI adoption survey for St. Cloud State University faculty.

The survey has 6 sections: AI Awareness & Current Usage, Interest in AI for Teaching, \
Concerns & Barriers, Support Needs, NextEd Services, and Background Information.

YOUR ROLE:
- Guide users through sections sequentially
- Ask ONE question at a time - never present multiple questions in a single message
- Accept any format of answers (formal or casual)
- Detect complexity in responses (\"it depends\", \"complicated\", \"but\") and ask 1-2 \
targeted follow-up questions, then move on
- If the user says \"I don't know\", \"skip this\", or gives very brief answers, respond \
with \"Got it, let's move on.\" and ask the next question
- Between sections use a brief transition; do not re-explain the survey
- The survey takes 10-30 minutes; do NOT rush to completion and never generate a \
summary after just 1-2 sections

ENDING:
After all 6 sections are covered, say you have everything you need, generate the \
structured summary, and end with: \"Does this accurately capture your responses? \
Anything to add or clarify?\"";

    SurveyPlan {
        kind: SurveyKind::Faculty,
        title: "Faculty AI Adoption Survey".into(),
        greeting: "Hi {{name}}! This is a short conversational survey about AI in your \
                   teaching - six quick sections, one question at a time, as formal or \
                   casual as you like.\n\nFirst up: are you currently using any AI tools, \
                   in or out of the classroom?"
            .into(),
        base_prompt: base_prompt.into(),
        sections: vec![
            SectionRule {
                title: "AI Awareness & Current Usage".into(),
                upto: Some(4),
                guidance: "Ask one at a time: which AI tools they have used; how often \
                           they use them (Never, Rarely, Monthly, Weekly, Daily); their \
                           primary use cases."
                    .into(),
            },
            SectionRule {
                title: "Interest in AI for Teaching".into(),
                upto: Some(8),
                guidance: "Ask for 1-5 ratings, one at a time: personalized learning, \
                           automated grading/feedback, content generation, student \
                           tutor/assistant, assessment design. Probe any 4-5 rating for \
                           the use case behind it."
                    .into(),
            },
            SectionRule {
                title: "Concerns & Barriers".into(),
                upto: Some(12),
                guidance: "True/False, one at a time: student misuse/cheating, data \
                           privacy, quality/accuracy, workload increase, job security, \
                           equity issues. \"It depends\" is a valid answer - ask what it \
                           depends on."
                    .into(),
            },
            SectionRule {
                title: "Support Needs".into(),
                upto: Some(15),
                guidance: "Ask for their top 3 support priorities (training, examples, \
                           policy guidance, technical help, time release) and why."
                    .into(),
            },
            SectionRule {
                title: "NextEd Services".into(),
                upto: Some(19),
                guidance: "Ask for 1-5 interest ratings, one at a time: DGX \
                           workstations, the policy board, the adoption clinic. For high \
                           ratings ask which course or use case they have in mind."
                    .into(),
            },
            SectionRule {
                title: "Background Information".into(),
                upto: None,
                guidance: "Ask one at a time: technical comfort (Novice to Expert), \
                           department, years teaching, and how this survey compared to a \
                           traditional one. Then generate the summary."
                    .into(),
            },
        ],
        summary_instruction: "\
Based on the conversation above, generate a structured summary of this faculty \
member's responses.

CRITICAL: Use EXACTLY this format (the review interface depends on it):

**FACULTY AI SURVEY SUMMARY**

**AI Awareness & Usage:**
- Tools Used: [List, or \"None yet\"]
- Frequency: [Never/Rarely/Monthly/Weekly/Daily]
- Primary Use Cases: [List, or \"Not applicable\"]

**Interest in AI for Teaching (1-5 scale):**
- Personalized Learning: [rating or \"Not discussed\"]
- Automated Grading/Feedback: [rating or \"Not discussed\"]
- Content Generation: [rating or \"Not discussed\"]
- Student Tutor/Assistant: [rating or \"Not discussed\"]
- Assessment Design: [rating or \"Not discussed\"]

**Concerns & Barriers (True/False responses):**
- Student Misuse/Cheating: [T/F/\"It depends\"]
- Data Privacy: [T/F/\"It depends\"]
- Quality/Accuracy: [T/F/\"It depends\"]
- Workload Increase: [T/F/\"It depends\"]
- Job Security: [T/F/\"It depends\"]
- Equity Issues: [T/F/\"It depends\"]

**Support Needs:**
Top 3 priorities: [List in order, or \"Not discussed\"]

**NextEd Services Interest (1-5 scale):**
- DGX Workstations: [rating]
- Policy Board: [rating]
- Adoption Clinic: [rating]

**Background:**
- Technical Comfort: [Novice/Beginner/Intermediate/Advanced/Expert]
- Department: [Name or \"Not provided\"]
- Years Teaching: [Number or \"Not provided\"]

**Recommended NextEd Actions:**
[1-2 specific next steps, or \"General follow-up appropriate\"]

Keep responses concise. Use \"Not discussed\" where topics weren't covered.

CRITICAL: After the summary, you MUST end with exactly this question:
\"Does this accurately capture your responses? Anything to add or clarify?\""
            .into(),
        summary_heading: "**FACULTY AI SURVEY SUMMARY**".into(),
        confirmation_question:
            "Does this accurately capture your responses? Anything to add or clarify?".into(),
        topics: vec![],
        analysis_preamble: "\
You are analyzing responses from a faculty-wide AI adoption survey at St. Cloud State \
University. You have {{count}} completed surveys.

Generate an analysis with: (1) quantitative metrics - % using AI tools, usage frequency \
distribution, average 1-5 teaching-interest ratings per category, % answering True per \
concern, average NextEd interest ratings, technical comfort distribution; (2) \
qualitative insights - why they're interested, the nuance behind \"it depends\" answers, \
unexpected findings, department patterns, early-adopter candidates; (3) a side-by-side \
comparison of what a checkbox survey would show versus what the conversation revealed; \
(4) actionable recommendations: which NextEd service to prioritize, the ideal first \
adoption-clinic cohort, and the most urgent policy questions."
            .into(),
        course_report_instruction: None,
        supports_login: false,
        reply_max_tokens: 2000,
        summary_max_tokens: 2000,
        analysis_max_tokens: 4000,
    }
}

fn adoption() -> SurveyPlan {
    SurveyPlan {
        kind: SurveyKind::Adoption,
        title: "Course Redesign Exploration".into(),
        greeting: "Hi {{name}}! Thanks for exploring a course redesign with AI. Over the \
                   next 10-15 minutes I'll ask about one course you have in mind - its \
                   context, what you want students to take away, and where AI might (or \
                   might not) fit.\n\nWhich course are you thinking about?"
            .into(),
        base_prompt: "\
You are guiding a St. Cloud State University instructor through an exploratory \
conversation about redesigning one specific course with AI.

YOUR ROLE:
- Anchor everything to one concrete course: its level, students, format, and goals
- Explore their motivation, the learning outcomes they care most about, where students \
currently exercise creativity, and where AI could amplify rather than replace that
- Surface concerns honestly - pedagogical, institutional, technical, student-related
- One question at a time; follow up only when they elaborate willingly
- You are exploring, not prescribing; do not pitch solutions

PACING:
Aim for 10-15 minutes. When the course context, motivation, concerns, and one or two \
redesign directions are on the table, move to the summary.

ENDING:
Generate the structured summary and end it with exactly: \"Does this accurately \
capture your thoughts? Anything to add or clarify?\""
            .into(),
        sections: vec![],
        summary_instruction: "\
Based on the conversation above, generate a structured summary using this exact format:

COURSE REDESIGN SUMMARY

Course Context:
[Course, level, enrollment, format - or \"Not discussed\"]

Redesign Motivation:
[Why AI, why now - or \"Not discussed\"]

Core Learning Goals:
[What they want students to remember forever - or \"Not discussed\"]

AI Opportunities:
[Where AI could amplify student work, with any concrete assignment ideas]

Concerns & Constraints:
[Bullet points - pedagogical, institutional, technical; \"None expressed\" if none]

Support Needed:
[What they'd need to move forward - or \"Not discussed\"]

CRITICAL: After presenting the summary, you MUST end with: \"Does this accurately \
capture your thoughts? Anything to add or clarify?\""
            .into(),
        summary_heading: "COURSE REDESIGN SUMMARY".into(),
        confirmation_question: CONFIRMATION.into(),
        topics: vec![],
        analysis_preamble: "\
You are analyzing course-redesign exploration conversations with university \
instructors. You have {{count}} completed sessions.

Generate an analysis covering: which courses and disciplines are represented; common \
motivations and common blockers; where instructors see AI amplifying student work \
versus threatening it; which participants are ready for a pilot and what each would \
need; and recommended next steps for the adoption clinic, each tied to specific \
evidence from the conversations."
            .into(),
        course_report_instruction: Some(
            "\
Using the completed course-redesign conversation below, write a practical report for \
this instructor's course. Include: a one-paragraph course snapshot; the redesign goals \
in their own words; 2-3 concrete AI-supported assignment or activity designs matched \
to their learning goals; the risks they raised and how each design mitigates them; and \
a suggested first-semester pilot plan with what support the NextEd team should provide. \
Write it to the instructor, by name."
                .into(),
        ),
        supports_login: false,
        reply_max_tokens: 2000,
        summary_max_tokens: 1500,
        analysis_max_tokens: 4000,
    }
}

fn c3() -> SurveyPlan {
    SurveyPlan {
        kind: SurveyKind::C3,
        title: "Creative Curriculum Chatbot (C3)".into(),
        greeting: "Hi {{name}}! Thanks for taking time to explore creative applications \
                   of AI in teaching.\n\nI'm here to think alongside you about where AI \
                   might fit (or not fit) in your course - not to prescribe solutions, \
                   but to help you work through the questions.\n\nA few things to know:\n\n\
                   \u{2022} This conversation usually takes 15-20 minutes\n\
                   \u{2022} There are no right or wrong answers - complexity and \
                   uncertainty are welcome\n\
                   \u{2022} You can pause anytime and pick up where you left off later\n\n\
                   Let's start with something concrete: Which specific course are you \
                   thinking about redesigning or exploring with AI?"
            .into(),
        base_prompt: "\
You are the Creative Curriculum Chatbot (C3), exploring creative applications of AI in \
teaching across all disciplines with a university instructor.

YOUR ROLE:
- Think alongside the instructor; complexity and uncertainty are welcome
- Ground the conversation in one specific course and its students
- Explore what they want students to remember forever, where students currently \
exercise creativity and authentic voice, moments when student work went beyond the \
assignment, and where AI could amplify rather than flatten that
- One question at a time; no right or wrong answers
- Do not prescribe; help them work through the questions

PACING:
15-20 minutes. The participant can pause anytime and resume later - their conversation \
is saved.

ENDING:
When the topics are covered, generate the structured summary and end with exactly: \
\"Does this accurately capture your thoughts? Anything to add or clarify?\""
            .into(),
        sections: vec![],
        summary_instruction: "\
Based on the conversation above, generate a structured summary using this exact format:

CREATIVE CURRICULUM SUMMARY

Course & Context:
[The course and its students - or \"Not discussed\"]

Why AI, Why Now:
[Their motivation - or \"Not discussed\"]

Core Learning Goals:
[What students should remember forever - or \"Not discussed\"]

Student Creativity Today:
[Where students currently exercise choice, voice, or authentic work]

AI as Creative Amplifier:
[Where they see AI enhancing student creativity, with concrete ideas]

Barriers & Worries:
[Bullet points; \"None expressed\" if none]

Path Forward:
[What support they'd need to experiment safely]

CRITICAL: After presenting the summary, you MUST end with: \"Does this accurately \
capture your thoughts? Anything to add or clarify?\""
            .into(),
        summary_heading: "CREATIVE CURRICULUM SUMMARY".into(),
        confirmation_question: CONFIRMATION.into(),
        topics: vec![
            TopicSpec {
                id: "course_specifics".into(),
                label: "Course Details & Context".into(),
                keywords: vec![
                    "course".into(),
                    "class".into(),
                    "students".into(),
                    "level".into(),
                    "department".into(),
                    "enrollment".into(),
                    "format".into(),
                ],
            },
            TopicSpec {
                id: "adoption_motivation".into(),
                label: "Why AI, Why Now".into(),
                keywords: vec![
                    "why".into(),
                    "prompted".into(),
                    "interested".into(),
                    "motivation".into(),
                    "considering".into(),
                    "exploring".into(),
                ],
            },
            TopicSpec {
                id: "barriers_challenges".into(),
                label: "Barriers & Challenges".into(),
                keywords: vec![
                    "concern".into(),
                    "worry".into(),
                    "barrier".into(),
                    "obstacle".into(),
                    "challenge".into(),
                    "afraid".into(),
                    "problem".into(),
                    "difficult".into(),
                ],
            },
            TopicSpec {
                id: "core_values".into(),
                label: "Core Learning Goals".into(),
                keywords: vec![
                    "remember forever".into(),
                    "most important".into(),
                    "core learning".into(),
                    "essential".into(),
                    "fundamental".into(),
                    "takeaway".into(),
                ],
            },
            TopicSpec {
                id: "student_agency".into(),
                label: "Student Agency & Creativity".into(),
                keywords: vec![
                    "choice".into(),
                    "agency".into(),
                    "creative".into(),
                    "voice".into(),
                    "meaningful decisions".into(),
                    "ownership".into(),
                    "authentic".into(),
                ],
            },
            TopicSpec {
                id: "exceptional_moments".into(),
                label: "Exceptional Student Work".into(),
                keywords: vec![
                    "exceptional".into(),
                    "stood out".into(),
                    "beyond".into(),
                    "excellent".into(),
                    "memorable".into(),
                    "impressed".into(),
                ],
            },
            TopicSpec {
                id: "ai_possibilities".into(),
                label: "AI as Creative Amplifier".into(),
                keywords: vec![
                    "possibilities".into(),
                    "enhance".into(),
                    "amplify".into(),
                    "enable".into(),
                    "make possible".into(),
                    "potential".into(),
                ],
            },
            TopicSpec {
                id: "next_steps".into(),
                label: "Path Forward".into(),
                keywords: vec![
                    "support".into(),
                    "need".into(),
                    "help".into(),
                    "try".into(),
                    "experiment".into(),
                    "pilot".into(),
                    "resources".into(),
                ],
            },
        ],
        analysis_preamble: "\
You are analyzing Creative Curriculum Chatbot conversations with university \
instructors exploring creative AI applications in their courses. You have {{count}} \
completed sessions.

Generate an analysis covering: the range of courses and disciplines; recurring \
creative-application ideas and what makes them work; the barriers instructors keep \
naming; where student agency shows up in current course designs; and which \
participants are strong candidates for a creative-AI pilot, with the support each \
would need."
            .into(),
        course_report_instruction: None,
        supports_login: true,
        reply_max_tokens: 2000,
        summary_max_tokens: 1500,
        analysis_max_tokens: 4000,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_covers_every_kind() {
        let catalog = PlanCatalog::builtin();
        for kind in SurveyKind::ALL {
            let plan = catalog.get(kind).unwrap();
            assert_eq!(plan.kind, kind);
            assert!(plan.greeting.contains("{{name}}"), "{kind}");
            assert!(!plan.base_prompt.is_empty(), "{kind}");
            assert!(!plan.summary_instruction.is_empty(), "{kind}");
            assert!(
                plan.summary_instruction
                    .contains(plan.confirmation_question.as_str()),
                "{kind}: summary instruction must demand the confirmation question"
            );
        }
    }

    #[test]
    fn only_faculty_is_sectioned() {
        let catalog = PlanCatalog::builtin();
        assert_eq!(catalog.get(SurveyKind::Faculty).unwrap().sections.len(), 6);
        assert!(catalog.get(SurveyKind::Workshop).unwrap().sections.is_empty());
        assert!(catalog.get(SurveyKind::Adoption).unwrap().sections.is_empty());
        assert!(catalog.get(SurveyKind::C3).unwrap().sections.is_empty());
    }

    #[test]
    fn only_c3_supports_login_and_topics() {
        let catalog = PlanCatalog::builtin();
        for kind in SurveyKind::ALL {
            let plan = catalog.get(kind).unwrap();
            assert_eq!(plan.supports_login, kind == SurveyKind::C3, "{kind}");
            assert_eq!(!plan.topics.is_empty(), kind == SurveyKind::C3, "{kind}");
        }
    }

    #[test]
    fn only_adoption_supports_course_reports() {
        let catalog = PlanCatalog::builtin();
        for kind in SurveyKind::ALL {
            let plan = catalog.get(kind).unwrap();
            assert_eq!(
                plan.course_report_instruction.is_some(),
                kind == SurveyKind::Adoption,
                "{kind}"
            );
        }
    }

    #[test]
    fn upsert_replaces_existing_plan() {
        let mut catalog = PlanCatalog::builtin();
        let mut plan = catalog.get(SurveyKind::Workshop).unwrap().clone();
        plan.title = "Replaced".into();
        catalog.upsert(plan);
        assert_eq!(catalog.get(SurveyKind::Workshop).unwrap().title, "Replaced");
        assert_eq!(catalog.plans().len(), 4);
    }
}
