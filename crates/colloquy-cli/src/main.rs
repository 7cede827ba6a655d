//! The `colloquy` binary: loads configuration, wires the stores and driver
//! together, and serves the survey gateway.

use clap::{Parser, Subcommand};
use colloquy_driver::{GenerationConfig, PlanCatalog, SurveyDriver, SurveyPlan};
use colloquy_gateway::{AppState, GatewayServer};
use colloquy_session::{
    FileTranscriptStore, InMemorySessionRegistry, ReportStore, SessionLocks,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "colloquy", about = "Colloquy — Conversational Survey Platform")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "colloquy.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the survey gateway
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Manage survey plans
    Survey {
        #[command(subcommand)]
        action: SurveyAction,
    },
}

#[derive(Subcommand)]
enum SurveyAction {
    /// List the survey plans being served
    List,
}

#[derive(Deserialize)]
struct ColloquyConfig {
    model: GenerationConfig,
    #[serde(default = "default_data_dir")]
    data_dir: PathBuf,
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    admin: AdminConfig,
    /// Optional plan overrides; each entry replaces the built-in plan for its
    /// survey kind.
    #[serde(default)]
    surveys: Vec<SurveyPlan>,
    /// Directory of static front-end assets to serve, if any.
    #[serde(default)]
    public_dir: Option<PathBuf>,
}

#[derive(Deserialize)]
struct ServerConfig {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Deserialize, Default)]
struct AdminConfig {
    #[serde(default)]
    token: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}

/// Env vars fill config gaps: `ANTHROPIC_API_KEY` for the model key,
/// `ADMIN_PASSWORD` for the admin token.
fn apply_env_overrides(config: &mut ColloquyConfig) {
    if config.model.api_key.is_empty() {
        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            config.model.api_key = key;
        }
    }
    if config.admin.token.is_empty() {
        if let Ok(token) = std::env::var("ADMIN_PASSWORD") {
            config.admin.token = token;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config_str = tokio::fs::read_to_string(&cli.config).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to read config file '{}': {}",
            cli.config.display(),
            e
        )
    })?;
    let mut config: ColloquyConfig = toml::from_str(&config_str)?;
    apply_env_overrides(&mut config);

    let mut catalog = PlanCatalog::builtin();
    for plan in config.surveys.drain(..) {
        info!(survey = %plan.kind, "survey plan overridden from config");
        catalog.upsert(plan);
    }

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);

            if config.model.api_key.is_empty() {
                anyhow::bail!(
                    "No generation API key: set model.api_key in {} or ANTHROPIC_API_KEY",
                    cli.config.display()
                );
            }
            let admin_token = if config.admin.token.is_empty() {
                warn!("No admin token configured; using the development default");
                "admin123".to_string()
            } else {
                config.admin.token
            };

            let store = Arc::new(
                FileTranscriptStore::new(config.data_dir.join("sessions")).await?,
            );
            let reports = Arc::new(ReportStore::new(config.data_dir.join("reports")).await?);
            let registry = Arc::new(InMemorySessionRegistry::new());
            let driver = Arc::new(SurveyDriver::new(config.model));

            let surveys: Vec<String> = catalog
                .plans()
                .iter()
                .map(|p| p.kind.to_string())
                .collect();
            let state = Arc::new(AppState {
                store,
                registry,
                locks: SessionLocks::new(),
                reports,
                driver,
                catalog,
            });

            let app = GatewayServer::build(state, admin_token, config.public_dir);

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!(
                addr = %addr,
                surveys = surveys.join(",").as_str(),
                "Colloquy gateway listening"
            );
            axum::serve(listener, app).await?;
        }
        Commands::Survey { action } => match action {
            SurveyAction::List => {
                println!("Survey plans:");
                for plan in catalog.plans() {
                    println!("  {} — {}", plan.kind, plan.title);
                    if !plan.sections.is_empty() {
                        println!("    sections: {}", plan.sections.len());
                    }
                    if !plan.topics.is_empty() {
                        println!("    topics: {}", plan.topics.len());
                    }
                    if plan.supports_login {
                        println!("    login/resume: enabled");
                    }
                }
                println!("\nTotal: {} plan(s)", catalog.plans().len());
            }
        },
    }

    Ok(())
}
