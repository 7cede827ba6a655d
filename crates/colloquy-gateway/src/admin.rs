use crate::error::ApiResult;
use crate::server::AppState;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use colloquy_core::{
    ColloquyError, Participant, SessionStatus, SurveyKind, TranscriptRecord, TranscriptRef,
};
use colloquy_driver::SessionDigest;
use colloquy_session::ReportKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// `GET /api/admin/sessions` query string.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub survey_type: Option<String>,
}

/// One row in the admin session listing.
#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub survey_type: SurveyKind,
    pub filename: String,
    pub participant: Participant,
    pub status: SessionStatus,
    pub start_time: DateTime<Utc>,
    pub completed_time: Option<DateTime<Utc>>,
}

/// Admin paths accept either one survey kind or `all`.
fn selected_kinds(survey_type: &str) -> Result<Vec<SurveyKind>, ColloquyError> {
    if survey_type == "all" {
        Ok(SurveyKind::ALL.to_vec())
    } else {
        Ok(vec![survey_type.parse()?])
    }
}

fn safe_filename(filename: &str) -> Result<(), ColloquyError> {
    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        return Err(ColloquyError::Validation("Invalid filename".to_string()));
    }
    Ok(())
}

fn session_ref(survey_type: &str, filename: &str) -> Result<TranscriptRef, ColloquyError> {
    safe_filename(filename)?;
    Ok(TranscriptRef {
        survey: survey_type.parse()?,
        filename: filename.to_string(),
    })
}

/// Lists session metadata across one or all survey kinds, newest first.
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let survey_type = query.survey_type.unwrap_or_else(|| "all".to_string());
    let mut sessions = Vec::new();

    for kind in selected_kinds(&survey_type)? {
        for (fileref, record) in state.store.list(kind).await? {
            sessions.push(SessionSummary {
                survey_type: kind,
                filename: fileref.filename,
                start_time: record.participant.start_time,
                completed_time: record.completed_time,
                status: record.status,
                participant: record.participant,
            });
        }
    }
    sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));

    Ok(Json(serde_json::json!({ "sessions": sessions })))
}

/// Downloads one transcript file.
pub async fn download_session(
    State(state): State<Arc<AppState>>,
    Path((survey_type, filename)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let fileref = session_ref(&survey_type, &filename)?;
    let record = state.store.read(&fileref).await?;
    let body = serde_json::to_string_pretty(&record).map_err(ColloquyError::from)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    ))
}

/// Deletes one transcript file.
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path((survey_type, filename)): Path<(String, String)>,
) -> ApiResult<Json<serde_json::Value>> {
    let fileref = session_ref(&survey_type, &filename)?;
    state.store.delete(&fileref).await?;
    info!(survey = %fileref.survey, filename = %fileref.filename, "session deleted");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Session deleted successfully"
    })))
}

/// Bulk-downloads every record for one or all survey kinds.
pub async fn download_all(
    State(state): State<Arc<AppState>>,
    Path(survey_type): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let mut records: Vec<TranscriptRecord> = Vec::new();
    for kind in selected_kinds(&survey_type)? {
        for (_, record) in state.store.list(kind).await? {
            records.push(record);
        }
    }
    let body = serde_json::to_string_pretty(&records).map_err(ColloquyError::from)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"all-sessions-{survey_type}.json\""),
            ),
        ],
        body,
    ))
}

/// Bulk-deletes every record for one or all survey kinds.
pub async fn delete_all(
    State(state): State<Arc<AppState>>,
    Path(survey_type): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut deleted = 0usize;
    for kind in selected_kinds(&survey_type)? {
        for (fileref, _) in state.store.list(kind).await? {
            if state.store.delete(&fileref).await.is_ok() {
                deleted += 1;
            }
        }
    }
    info!(count = deleted, "bulk session delete");

    Ok(Json(serde_json::json!({
        "success": true,
        "deleted_count": deleted,
        "message": format!("Successfully deleted {deleted} session(s)")
    })))
}

/// Runs the aggregate analysis over a survey's completed sessions.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Path(survey_type): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let kind: SurveyKind = survey_type.parse()?;
    let plan = state.plan(kind)?;

    let records = state.store.list(kind).await?;
    if records.is_empty() {
        return Err(ColloquyError::Validation("No sessions to analyze".into()).into());
    }

    let digests: Vec<SessionDigest> = records
        .iter()
        .filter(|(_, r)| r.status == SessionStatus::Completed)
        .filter_map(|(_, r)| {
            r.summary.as_ref().map(|s| SessionDigest {
                participant: r.participant.name.clone(),
                summary: if s.confirmed.is_empty() {
                    s.initial.clone()
                } else {
                    s.confirmed.clone()
                },
            })
        })
        .collect();

    if digests.is_empty() {
        return Err(ColloquyError::Validation("No completed sessions to analyze".into()).into());
    }

    info!(survey = %kind, sessions = digests.len(), "running analysis");
    let analysis = state.driver.analyze(plan, &digests).await?;
    Ok(Json(serde_json::json!({ "analysis": analysis })))
}

/// Generates (or returns the cached) per-participant course report.
pub async fn course_report(
    State(state): State<Arc<AppState>>,
    Path((survey_type, filename)): Path<(String, String)>,
) -> ApiResult<Json<serde_json::Value>> {
    let kind: SurveyKind = survey_type.parse()?;
    let plan = state.plan(kind)?;
    if plan.course_report_instruction.is_none() {
        return Err(ColloquyError::Validation(format!(
            "Course reports are not available for {kind} surveys"
        ))
        .into());
    }
    safe_filename(&filename)?;

    let fileref = TranscriptRef {
        survey: kind,
        filename,
    };
    let record = state.store.read(&fileref).await?;

    if record.status != SessionStatus::Completed || record.summary.is_none() {
        return Err(ColloquyError::Validation(
            "Can only generate reports for completed sessions".into(),
        )
        .into());
    }

    if let Some(cached) = record.course_report.as_deref() {
        info!(filename = %fileref.filename, "using cached course report");
        return Ok(Json(serde_json::json!({ "report": cached })));
    }

    let report = state.driver.course_report(plan, &record).await?;
    state
        .store
        .attach_course_report(&fileref, &report)
        .await?;
    info!(filename = %fileref.filename, "course report generated");

    Ok(Json(serde_json::json!({ "report": report })))
}

/// `POST /api/admin/save-analysis` request body.
#[derive(Debug, Deserialize)]
pub struct SaveAnalysisRequest {
    #[serde(default)]
    pub survey_type: Option<String>,
    #[serde(default)]
    pub analysis: Option<String>,
}

/// Persists an analysis report under the reports directory.
pub async fn save_analysis(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SaveAnalysisRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let (Some(survey_type), Some(analysis)) = (body.survey_type, body.analysis) else {
        return Err(ColloquyError::Validation("Survey type and analysis required".into()).into());
    };
    let kind: SurveyKind = survey_type.parse()?;

    let filename = state.reports.save_analysis(kind, &analysis).await?;
    info!(%filename, "analysis report saved");
    Ok(Json(
        serde_json::json!({ "success": true, "filename": filename }),
    ))
}

/// `POST /api/admin/save-course-report` request body.
#[derive(Debug, Deserialize)]
pub struct SaveCourseReportRequest {
    #[serde(default)]
    pub survey_type: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub participant_name: Option<String>,
    #[serde(default)]
    pub report: Option<String>,
}

/// Persists a course report under the reports directory.
pub async fn save_course_report(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SaveCourseReportRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let (Some(_survey_type), Some(_source), Some(report)) =
        (body.survey_type, body.filename, body.report)
    else {
        return Err(
            ColloquyError::Validation("Survey type, filename, and report required".into()).into(),
        );
    };
    let participant = body.participant_name.unwrap_or_else(|| "unknown".into());

    let filename = state
        .reports
        .save_course_report(&participant, &report)
        .await?;
    info!(%filename, "course report saved");
    Ok(Json(
        serde_json::json!({ "success": true, "filename": filename }),
    ))
}

/// Lists saved reports with size and modification time.
pub async fn list_reports(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<colloquy_session::ReportListing>> {
    Ok(Json(state.reports.list().await?))
}

/// Downloads one saved report as plain text.
pub async fn download_report(
    State(state): State<Arc<AppState>>,
    Path((kind, filename)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let kind: ReportKind = kind.parse()?;
    safe_filename(&filename)?;

    let content = state.reports.read(kind, &filename).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        content,
    ))
}

/// Deletes one saved report.
pub async fn delete_report(
    State(state): State<Arc<AppState>>,
    Path((kind, filename)): Path<(String, String)>,
) -> ApiResult<Json<serde_json::Value>> {
    let kind: ReportKind = kind.parse()?;
    safe_filename(&filename)?;

    state.reports.delete(kind, &filename).await?;
    info!(kind = kind.as_str(), %filename, "report deleted");
    Ok(Json(serde_json::json!({ "success": true })))
}
