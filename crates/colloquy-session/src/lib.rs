//! Session persistence for Colloquy: the file-backed transcript store, the
//! in-memory session registry, per-session write locks, and the saved-report
//! store.

/// In-memory session registry and per-session write serialization.
pub mod registry;
/// Saved analysis/course report files.
pub mod reports;
/// File-backed transcript store.
pub mod transcript;

pub use registry::{InMemorySessionRegistry, SessionEntry, SessionLocks, SessionRegistry};
pub use reports::{ReportKind, ReportListing, ReportMeta, ReportStore};
pub use transcript::{FileTranscriptStore, TranscriptStore};
