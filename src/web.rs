//! HTTP surface of the dashboard: JSON endpoints over the derived day
//! snapshot plus the static page that renders them. Handlers never touch
//! the history table directly; every read goes through the cached
//! `load_report` path so one load serves the whole page.
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderName, HeaderValue, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Redirect};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Local, NaiveDate};
use miette::IntoDiagnostic;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;
use tower_http::services::ServeDir;

use crate::cache::{ReportCache, ReportKey};
use crate::errors::EphemerisError;
use crate::report::{self, DayReport, JobDetail, JobListEntry, StatusFilter, Summary};
use crate::settings::Settings;
use crate::storage;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db: DatabaseConnection,
    pub cache: Arc<ReportCache>,
    pub refresh_epoch: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(settings: Settings, db: DatabaseConnection) -> Self {
        let cache = Arc::new(ReportCache::new(settings.cache_ttl()));
        Self {
            settings: Arc::new(settings),
            db,
            cache,
            refresh_epoch: Arc::new(AtomicU64::new(0)),
        }
    }
}

// Security headers middleware
async fn security_headers(request: Request<Body>, next: Next) -> impl IntoResponse {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    // X-Frame-Options: Prevent clickjacking
    headers.insert(
        HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    );

    // X-Content-Type-Options: Prevent MIME sniffing
    headers.insert(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    );

    // Content-Security-Policy: Restrict resource loading
    headers.insert(
        HeaderName::from_static("content-security-policy"),
        HeaderValue::from_static(
            "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; form-action 'self'",
        ),
    );

    // Referrer-Policy: Control referrer information
    headers.insert(
        HeaderName::from_static("referrer-policy"),
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    response
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_redirect))
        .route("/healthz", get(health))
        .route("/api/summary", get(summary))
        .route("/api/jobs", get(list_jobs))
        .route("/api/jobs/{job_name}", get(job_detail))
        .route("/api/refresh", post(refresh))
        .nest_service("/static", ServeDir::new("static"))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

pub async fn serve(settings: Settings, db: DatabaseConnection) -> miette::Result<()> {
    let state = AppState::new(settings, db);

    let addr: SocketAddr = state
        .settings
        .bind_addr()
        .parse()
        .map_err(|e| miette::miette!("bad listen addr: {e}"))?;

    let app = router(state);

    tracing::info!(%addr, "Dashboard listening");
    let listener = tokio::net::TcpListener::bind(addr).await.into_diagnostic()?;
    axum::serve(listener, app).await.into_diagnostic()?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct DateQuery {
    date: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct JobsQuery {
    date: Option<i32>,
    #[serde(default)]
    status: StatusFilter,
    search: Option<String>,
}

/// Validate the requested day key, defaulting to today in local time when
/// the request does not name one.
fn resolve_run_date(date: Option<i32>) -> Result<i32, EphemerisError> {
    match date {
        Some(value) => {
            let parsed = NaiveDate::parse_from_str(&value.to_string(), "%Y%m%d")
                .map_err(|_| EphemerisError::InvalidDate(value.to_string()))?;
            // chrono tolerates 1-2 digit month/day fields; require the
            // canonical 8-digit key so 2025111 is not read as 2025-11-01
            if parsed.format("%Y%m%d").to_string() != value.to_string() {
                return Err(EphemerisError::InvalidDate(value.to_string()));
            }
            Ok(value)
        }
        None => {
            let today = Local::now().format("%Y%m%d").to_string();
            today
                .parse::<i32>()
                .map_err(|_| EphemerisError::InvalidDate(today))
        }
    }
}

/// Cache-aware load: reuse the snapshot for `(run_date, refresh_epoch)`
/// within the TTL, otherwise run the single fetch plus the derivation
/// pipeline and cache the result.
async fn load_report(
    state: &AppState,
    run_date: i32,
) -> Result<Arc<DayReport>, EphemerisError> {
    let key = ReportKey {
        run_date,
        refresh_epoch: state.refresh_epoch.load(Ordering::SeqCst),
    };
    if let Some(report) = state.cache.get(key) {
        return Ok(report);
    }

    let rows = storage::fetch_step_rows(&state.db, run_date).await?;
    tracing::info!("loaded {} history rows for {run_date}", rows.len());
    let report = Arc::new(report::build_report(run_date, rows));
    state.cache.insert(key, report.clone());
    Ok(report)
}

async fn index_redirect() -> impl IntoResponse {
    Redirect::temporary("/static/index.html")
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn summary(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Summary>, EphemerisError> {
    let run_date = resolve_run_date(query.date)?;
    let report = load_report(&state, run_date).await?;
    Ok(Json(report.summary()))
}

async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobsQuery>,
) -> Result<Json<serde_json::Value>, EphemerisError> {
    let run_date = resolve_run_date(query.date)?;
    let report = load_report(&state, run_date).await?;
    let jobs: Vec<JobListEntry> = report
        .filter_jobs(query.status, query.search.as_deref())
        .into_iter()
        .map(JobListEntry::from)
        .collect();
    Ok(Json(json!({ "run_date": run_date, "jobs": jobs })))
}

async fn job_detail(
    State(state): State<AppState>,
    Path(job_name): Path<String>,
    Query(query): Query<DateQuery>,
) -> Result<Json<JobDetail>, EphemerisError> {
    let run_date = resolve_run_date(query.date)?;
    let report = load_report(&state, run_date).await?;
    let job = report
        .job(&job_name)
        .ok_or(EphemerisError::JobNotFound(job_name))?;
    Ok(Json(JobDetail::from(job)))
}

async fn refresh(State(state): State<AppState>) -> impl IntoResponse {
    let epoch = state.refresh_epoch.fetch_add(1, Ordering::SeqCst) + 1;
    tracing::info!("refresh requested; cache epoch is now {epoch}");
    Json(json!({ "refresh_epoch": epoch }))
}
