use crate::middleware::{admin_auth, AdminAuth};
use crate::{admin, auth, survey};
use axum::middleware as axum_mw;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use colloquy_core::{ColloquyError, ColloquyResult, SurveyKind};
use colloquy_driver::{PlanCatalog, SurveyDriver, SurveyPlan};
use colloquy_session::{ReportStore, SessionLocks, SessionRegistry, TranscriptStore};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

/// Shared application state.
pub struct AppState {
    /// Transcript persistence.
    pub store: Arc<dyn TranscriptStore>,
    /// Session-token registry.
    pub registry: Arc<dyn SessionRegistry>,
    /// Per-session write serialization.
    pub locks: SessionLocks,
    /// Saved-report persistence.
    pub reports: Arc<ReportStore>,
    /// The conversation driver.
    pub driver: Arc<SurveyDriver>,
    /// The survey plans being served.
    pub catalog: PlanCatalog,
}

impl AppState {
    /// The plan for a survey kind. Every routed kind should have one; a miss
    /// is a server misconfiguration, not a client error.
    pub fn plan(&self, kind: SurveyKind) -> ColloquyResult<&SurveyPlan> {
        self.catalog
            .get(kind)
            .ok_or_else(|| ColloquyError::Config(format!("no plan registered for {kind}")))
    }
}

/// The main gateway server.
pub struct GatewayServer;

impl GatewayServer {
    /// Builds the full router: participant endpoints, the bearer-gated admin
    /// namespace, a health check, permissive CORS, and (optionally) static
    /// front-end assets as the fallback.
    pub fn build(
        state: Arc<AppState>,
        admin_token: impl Into<String>,
        public_dir: Option<PathBuf>,
    ) -> Router {
        let auth_state = Arc::new(AdminAuth::new(admin_token));

        let admin_routes = Router::new()
            .route("/admin/sessions", get(admin::list_sessions))
            .route(
                "/admin/sessions/{survey_type}/{filename}",
                get(admin::download_session).delete(admin::delete_session),
            )
            .route(
                "/admin/sessions-all/{survey_type}",
                get(admin::download_all).delete(admin::delete_all),
            )
            .route("/admin/analyze/{survey_type}", post(admin::analyze))
            .route(
                "/admin/course-report/{survey_type}/{filename}",
                post(admin::course_report),
            )
            .route("/admin/save-analysis", post(admin::save_analysis))
            .route("/admin/save-course-report", post(admin::save_course_report))
            .route("/admin/reports", get(admin::list_reports))
            .route(
                "/admin/reports/{kind}/{filename}",
                get(admin::download_report).delete(admin::delete_report),
            )
            .layer(axum_mw::from_fn_with_state(auth_state, admin_auth))
            .with_state(state.clone());

        let api = Router::new()
            .route("/{survey}/start", post(survey::start))
            .route("/{survey}/message", post(survey::message))
            .route("/{survey}/summary", post(survey::summary))
            .route("/{survey}/complete", post(survey::complete))
            .route("/{survey}/signup", post(auth::signup))
            .route("/{survey}/login", post(auth::login))
            .with_state(state.clone())
            .merge(admin_routes);

        let app = Router::new()
            .route("/health", get(health_handler))
            .nest("/api", api)
            .layer(CorsLayer::permissive());

        match public_dir {
            Some(dir) => app.fallback_service(ServeDir::new(dir)),
            None => app,
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok", "service": "colloquy"}))
}
