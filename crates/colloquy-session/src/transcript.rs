use async_trait::async_trait;
use chrono::Utc;
use colloquy_core::{
    ColloquyError, ColloquyResult, Role, SessionStatus, SummaryRecord, SurveyKind,
    TranscriptRecord, TranscriptRef,
};
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// TranscriptStore trait
// ---------------------------------------------------------------------------

/// Persistence contract for survey transcripts.
///
/// One record per participant attempt, stored under a subfolder per survey
/// kind. There is no transactional guarantee across the read-modify-write
/// cycle; callers serialize mutations per session (see
/// [`crate::SessionLocks`]).
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Creates a new in-progress record with an empty conversation.
    async fn create(
        &self,
        name: &str,
        email: &str,
        survey: SurveyKind,
    ) -> ColloquyResult<(TranscriptRef, TranscriptRecord)>;

    /// Appends one turn to the conversation and rewrites the file.
    async fn append(
        &self,
        fileref: &TranscriptRef,
        role: Role,
        content: &str,
    ) -> ColloquyResult<TranscriptRecord>;

    /// Marks the record completed with the given summary. Calling twice
    /// overwrites the summary silently.
    async fn complete(
        &self,
        fileref: &TranscriptRef,
        summary: SummaryRecord,
    ) -> ColloquyResult<TranscriptRecord>;

    /// Reads one record.
    async fn read(&self, fileref: &TranscriptRef) -> ColloquyResult<TranscriptRecord>;

    /// Reads every record for a survey kind. Files that fail to parse are
    /// skipped rather than failing the whole listing.
    async fn list(&self, survey: SurveyKind) -> ColloquyResult<Vec<(TranscriptRef, TranscriptRecord)>>;

    /// Deletes one record. `NotFound` if the file is missing.
    async fn delete(&self, fileref: &TranscriptRef) -> ColloquyResult<()>;

    /// Newest in-progress record for the given email, if any. Used by the
    /// login/resume path to re-derive the session mapping from disk.
    async fn find_resumable(
        &self,
        survey: SurveyKind,
        email: &str,
    ) -> ColloquyResult<Option<(TranscriptRef, TranscriptRecord)>>;

    /// Replaces the participant password hash on an existing record.
    async fn set_password_hash(
        &self,
        fileref: &TranscriptRef,
        hash: &str,
    ) -> ColloquyResult<TranscriptRecord>;

    /// Caches a generated course report inside the record.
    async fn attach_course_report(
        &self,
        fileref: &TranscriptRef,
        report: &str,
    ) -> ColloquyResult<TranscriptRecord>;
}

// ---------------------------------------------------------------------------
// Filename derivation
// ---------------------------------------------------------------------------

/// Replaces `@` with `_at_` and anything outside `[A-Za-z0-9._-]` with `_`.
fn sanitize_email(email: &str) -> String {
    email
        .replacen('@', "_at_", 1)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn generate_filename(email: &str) -> String {
    let stamp = Utc::now().format("%Y-%m-%dT%H-%M-%S-%3fZ");
    format!("{}_{stamp}.json", sanitize_email(email))
}

// ---------------------------------------------------------------------------
// FileTranscriptStore
// ---------------------------------------------------------------------------

/// Transcript store backed by JSON files on disk, one subfolder per survey
/// kind under the root directory.
pub struct FileTranscriptStore {
    root: PathBuf,
}

impl FileTranscriptStore {
    /// Creates the store, ensuring the subfolder for every survey kind exists.
    pub async fn new(root: PathBuf) -> ColloquyResult<Self> {
        for kind in SurveyKind::ALL {
            tokio::fs::create_dir_all(root.join(kind.as_str())).await?;
        }
        Ok(Self { root })
    }

    fn path(&self, fileref: &TranscriptRef) -> PathBuf {
        self.root
            .join(fileref.survey.as_str())
            .join(&fileref.filename)
    }

    async fn write_record(
        &self,
        fileref: &TranscriptRef,
        record: &TranscriptRecord,
    ) -> ColloquyResult<()> {
        let json = serde_json::to_string_pretty(record)?;
        tokio::fs::write(self.path(fileref), json).await?;
        Ok(())
    }
}

#[async_trait]
impl TranscriptStore for FileTranscriptStore {
    async fn create(
        &self,
        name: &str,
        email: &str,
        survey: SurveyKind,
    ) -> ColloquyResult<(TranscriptRef, TranscriptRecord)> {
        let record = TranscriptRecord::new(name, email, survey);
        let fileref = TranscriptRef {
            survey,
            filename: generate_filename(email),
        };
        self.write_record(&fileref, &record).await?;
        Ok((fileref, record))
    }

    async fn append(
        &self,
        fileref: &TranscriptRef,
        role: Role,
        content: &str,
    ) -> ColloquyResult<TranscriptRecord> {
        let mut record = self.read(fileref).await?;
        record.push(role, content);
        self.write_record(fileref, &record).await?;
        Ok(record)
    }

    async fn complete(
        &self,
        fileref: &TranscriptRef,
        summary: SummaryRecord,
    ) -> ColloquyResult<TranscriptRecord> {
        let mut record = self.read(fileref).await?;
        record.complete(summary);
        self.write_record(fileref, &record).await?;
        Ok(record)
    }

    async fn read(&self, fileref: &TranscriptRef) -> ColloquyResult<TranscriptRecord> {
        let path = self.path(fileref);
        if !path.exists() {
            return Err(ColloquyError::NotFound(format!(
                "transcript {}/{}",
                fileref.survey, fileref.filename
            )));
        }
        let data = tokio::fs::read_to_string(&path).await?;
        serde_json::from_str(&data).map_err(|e| {
            ColloquyError::CorruptData(format!("{}/{}: {e}", fileref.survey, fileref.filename))
        })
    }

    async fn list(
        &self,
        survey: SurveyKind,
    ) -> ColloquyResult<Vec<(TranscriptRef, TranscriptRecord)>> {
        let dir = self.root.join(survey.as_str());
        let mut entries = tokio::fs::read_dir(&dir).await?;
        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Some(filename) = entry.file_name().to_str().map(String::from) else {
                continue;
            };
            if !filename.ends_with(".json") {
                continue;
            }
            let fileref = TranscriptRef { survey, filename };
            match self.read(&fileref).await {
                Ok(record) => records.push((fileref, record)),
                Err(_) => continue,
            }
        }
        Ok(records)
    }

    async fn delete(&self, fileref: &TranscriptRef) -> ColloquyResult<()> {
        let path = self.path(fileref);
        if !path.exists() {
            return Err(ColloquyError::NotFound(format!(
                "transcript {}/{}",
                fileref.survey, fileref.filename
            )));
        }
        tokio::fs::remove_file(path).await?;
        Ok(())
    }

    async fn find_resumable(
        &self,
        survey: SurveyKind,
        email: &str,
    ) -> ColloquyResult<Option<(TranscriptRef, TranscriptRecord)>> {
        let mut newest: Option<(TranscriptRef, TranscriptRecord)> = None;
        for (fileref, record) in self.list(survey).await? {
            if record.participant.email != email || record.status != SessionStatus::InProgress {
                continue;
            }
            let is_newer = newest
                .as_ref()
                .map(|(_, best)| record.participant.start_time > best.participant.start_time)
                .unwrap_or(true);
            if is_newer {
                newest = Some((fileref, record));
            }
        }
        Ok(newest)
    }

    async fn set_password_hash(
        &self,
        fileref: &TranscriptRef,
        hash: &str,
    ) -> ColloquyResult<TranscriptRecord> {
        let mut record = self.read(fileref).await?;
        record.participant.password_hash = Some(hash.to_string());
        record.last_updated = Utc::now();
        self.write_record(fileref, &record).await?;
        Ok(record)
    }

    async fn attach_course_report(
        &self,
        fileref: &TranscriptRef,
        report: &str,
    ) -> ColloquyResult<TranscriptRecord> {
        let mut record = self.read(fileref).await?;
        let now = Utc::now();
        record.course_report = Some(report.to_string());
        record.course_report_generated = Some(now);
        record.last_updated = now;
        self.write_record(fileref, &record).await?;
        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
