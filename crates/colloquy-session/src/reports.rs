use chrono::{DateTime, Utc};
use colloquy_core::{ColloquyError, ColloquyResult, SurveyKind};
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;

/// Which reports subfolder a saved report belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Aggregate analysis over a survey's completed sessions.
    Analysis,
    /// Per-participant course-redesign reports.
    Courses,
}

impl ReportKind {
    /// Subfolder name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Analysis => "analysis",
            ReportKind::Courses => "courses",
        }
    }
}

impl FromStr for ReportKind {
    type Err = ColloquyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "analysis" => Ok(ReportKind::Analysis),
            "courses" => Ok(ReportKind::Courses),
            other => Err(ColloquyError::Validation(format!(
                "Invalid report type: {other}"
            ))),
        }
    }
}

/// Listing metadata for one saved report file.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    /// Filename within the reports subfolder.
    pub filename: String,
    /// File modification time.
    pub created: DateTime<Utc>,
    /// Size in bytes.
    pub size: u64,
}

/// All saved reports, newest first per kind.
#[derive(Debug, Default, Serialize)]
pub struct ReportListing {
    /// Saved aggregate analysis reports.
    pub analysis: Vec<ReportMeta>,
    /// Saved course reports.
    pub courses: Vec<ReportMeta>,
}

fn timestamp_slug() -> String {
    Utc::now().format("%Y-%m-%dT%H-%M-%S-%3f").to_string()
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Stores generated report text as plain files under
/// `reports/{analysis|courses}/`.
pub struct ReportStore {
    root: PathBuf,
}

impl ReportStore {
    /// Creates the store, ensuring both subfolders exist.
    pub async fn new(root: PathBuf) -> ColloquyResult<Self> {
        for kind in [ReportKind::Analysis, ReportKind::Courses] {
            tokio::fs::create_dir_all(root.join(kind.as_str())).await?;
        }
        Ok(Self { root })
    }

    fn path(&self, kind: ReportKind, filename: &str) -> PathBuf {
        self.root.join(kind.as_str()).join(filename)
    }

    /// Saves an aggregate analysis report; returns the generated filename.
    pub async fn save_analysis(&self, survey: SurveyKind, text: &str) -> ColloquyResult<String> {
        let filename = format!("{survey}-analysis-{}.txt", timestamp_slug());
        tokio::fs::write(self.path(ReportKind::Analysis, &filename), text).await?;
        Ok(filename)
    }

    /// Saves a per-participant course report; returns the generated filename.
    pub async fn save_course_report(
        &self,
        participant_name: &str,
        text: &str,
    ) -> ColloquyResult<String> {
        let filename = format!(
            "course-{}-{}.txt",
            sanitize_name(participant_name),
            timestamp_slug()
        );
        tokio::fs::write(self.path(ReportKind::Courses, &filename), text).await?;
        Ok(filename)
    }

    /// Lists every saved report with size and modification time, newest first.
    pub async fn list(&self) -> ColloquyResult<ReportListing> {
        let mut listing = ReportListing::default();
        for kind in [ReportKind::Analysis, ReportKind::Courses] {
            let dir = self.root.join(kind.as_str());
            let mut entries = tokio::fs::read_dir(&dir).await?;
            let bucket = match kind {
                ReportKind::Analysis => &mut listing.analysis,
                ReportKind::Courses => &mut listing.courses,
            };
            while let Some(entry) = entries.next_entry().await? {
                let Some(filename) = entry.file_name().to_str().map(String::from) else {
                    continue;
                };
                if !filename.ends_with(".txt") {
                    continue;
                }
                let meta = entry.metadata().await?;
                let created = meta
                    .modified()
                    .map(DateTime::<Utc>::from)
                    .unwrap_or_else(|_| Utc::now());
                bucket.push(ReportMeta {
                    filename,
                    created,
                    size: meta.len(),
                });
            }
            bucket.sort_by(|a, b| b.created.cmp(&a.created));
        }
        Ok(listing)
    }

    /// Reads one saved report. `NotFound` if the file is missing.
    pub async fn read(&self, kind: ReportKind, filename: &str) -> ColloquyResult<String> {
        let path = self.path(kind, filename);
        if !path.exists() {
            return Err(ColloquyError::NotFound(format!(
                "report {}/{filename}",
                kind.as_str()
            )));
        }
        Ok(tokio::fs::read_to_string(path).await?)
    }

    /// Deletes one saved report. `NotFound` if the file is missing.
    pub async fn delete(&self, kind: ReportKind, filename: &str) -> ColloquyResult<()> {
        let path = self.path(kind, filename);
        if !path.exists() {
            return Err(ColloquyError::NotFound(format!(
                "report {}/{filename}",
                kind.as_str()
            )));
        }
        tokio::fs::remove_file(path).await?;
        Ok(())
    }
}
