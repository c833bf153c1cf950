use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stakepulse_core::aggregate::AggregatorOptions;
use stakepulse_core::domain::sentiment::{
    AnalysisLogEntry, GlobalSummary, Sentiment, SentimentVerdict, StakeholderRecord,
};
use stakepulse_core::error::{AnalyzeError, RecordError};
use stakepulse_core::service::AnalysisService;
use stakepulse_core::storage::analysis_log::PgAnalysisLog;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_RECENT_LIMIT: usize = 10;
const MAX_RECENT_LIMIT: usize = 100;
const DEFAULT_STAKEHOLDER: &str = "general";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = stakepulse_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let options = AggregatorOptions::from_settings(&settings);
    let service = match connect_store(&settings).await {
        Ok(store) => match AnalysisService::with_store(options.clone(), store).await {
            Ok(service) => service,
            Err(e) => {
                sentry_anyhow::capture_anyhow(&e);
                tracing::error!(error = %e, "analysis log restore failed; serving from memory only");
                AnalysisService::in_memory(options)
            }
        },
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "database unavailable; serving from memory only");
            AnalysisService::in_memory(options)
        }
    };

    let state = AppState {
        service: Arc::new(service),
    };

    let app = router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn connect_store(
    settings: &stakepulse_core::config::Settings,
) -> anyhow::Result<Arc<PgAnalysisLog>> {
    let db_url = settings.require_database_url()?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;
    stakepulse_core::storage::migrate(&pool).await?;
    Ok(Arc::new(PgAnalysisLog::new(pool)))
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .route("/api/score", post(score_text))
        .route("/api/analyze", post(analyze_text))
        .route("/api/stakeholders", get(get_stakeholders))
        .route("/api/sentiment-summary", get(get_summary))
        .route("/api/recent-analyses", get(get_recent_analyses))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(Clone)]
struct AppState {
    service: Arc<AnalysisService>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ErrorBody {
    detail: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            detail: detail.into(),
        }),
    )
}

fn map_analyze_error(err: AnalyzeError) -> ApiError {
    match err {
        AnalyzeError::EmptyInput(_) => api_error(StatusCode::BAD_REQUEST, "텍스트가 비어있습니다"),
        AnalyzeError::Record(RecordError::Validation(e)) => {
            api_error(StatusCode::BAD_REQUEST, e.to_string())
        }
        AnalyzeError::Record(RecordError::Store(e)) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "analysis log append failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "analysis could not be stored")
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RootMessage {
    message: String,
}

async fn root() -> Json<RootMessage> {
    Json(RootMessage {
        message: "센티멘트 분석 API 서버가 실행 중입니다".to_string(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
struct Health {
    status: String,
    timestamp: f64,
    durable: bool,
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "healthy".to_string(),
        timestamp: stakepulse_core::service::now_seconds(),
        durable: state.service.is_durable(),
    })
}

#[derive(Debug, Deserialize)]
struct ScoreRequest {
    text: String,
}

async fn score_text(Json(req): Json<ScoreRequest>) -> Result<Json<SentimentVerdict>, ApiError> {
    stakepulse_core::scoring::score(&req.text)
        .map(Json)
        .map_err(|e| map_analyze_error(e.into()))
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    text: String,
    #[serde(default = "default_stakeholder")]
    stakeholder_type: String,
}

fn default_stakeholder() -> String {
    DEFAULT_STAKEHOLDER.to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct AnalyzeResponse {
    text: String,
    sentiment: Sentiment,
    confidence: f64,
    stakeholder_type: String,
    keywords: Vec<String>,
    timestamp: f64,
}

impl From<AnalysisLogEntry> for AnalyzeResponse {
    fn from(entry: AnalysisLogEntry) -> Self {
        Self {
            text: entry.verdict.text,
            sentiment: entry.verdict.sentiment,
            confidence: entry.verdict.confidence,
            stakeholder_type: entry.stakeholder,
            keywords: entry.verdict.keywords,
            timestamp: entry.timestamp,
        }
    }
}

async fn analyze_text(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let stakeholder = if req.stakeholder_type.trim().is_empty() {
        DEFAULT_STAKEHOLDER
    } else {
        req.stakeholder_type.as_str()
    };

    let entry = state
        .service
        .analyze(&req.text, stakeholder)
        .await
        .map_err(map_analyze_error)?;

    Ok(Json(entry.into()))
}

#[derive(Debug, Serialize, Deserialize)]
struct StakeholdersResponse {
    stakeholders: Vec<StakeholderRecord>,
}

async fn get_stakeholders(State(state): State<AppState>) -> Json<StakeholdersResponse> {
    Json(StakeholdersResponse {
        stakeholders: state.service.stakeholders().await,
    })
}

async fn get_summary(State(state): State<AppState>) -> Json<GlobalSummary> {
    Json(state.service.summary().await)
}

#[derive(Debug, Default, Deserialize)]
struct RecentQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RecentResponse {
    analyses: Vec<AnalysisLogEntry>,
}

async fn get_recent_analyses(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Json<RecentResponse> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RECENT_LIMIT)
        .min(MAX_RECENT_LIMIT);
    Json(RecentResponse {
        analyses: state.service.recent(limit).await,
    })
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &stakepulse_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
