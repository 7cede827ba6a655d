//! The conversation driver for Colloquy.
//!
//! One parameterized [`SurveyDriver`] serves every survey variant. The text
//! that distinguishes variants — greetings, system prompts, section
//! schedules, summary instructions, topic keywords — lives in [`SurveyPlan`]
//! values, not code, and the built-in plans are assembled in [`catalog`].
//!
//! The external text-generation API is treated as a black box behind the
//! [`TextGenerator`] trait: ordered message history plus a system instruction
//! in, one text blob out. No retry, backoff, or circuit breaker.

/// Generation API backend.
pub mod backend;
/// Built-in survey plans.
pub mod catalog;
/// Summary/topic/disengagement heuristics.
pub mod classify;
/// Backend configuration.
pub mod config;
/// The parameterized conversation driver.
pub mod driver;
/// Survey plan data model.
pub mod plan;

pub use backend::{ClaudeBackend, TextGenerator};
pub use catalog::PlanCatalog;
pub use classify::{classify, covered_topics, is_stalled, SummaryVerdict, CLASSIFIER_VERSION};
pub use config::GenerationConfig;
pub use driver::{SessionDigest, SurveyDriver};
pub use plan::{SectionRule, SurveyPlan, TopicSpec};
