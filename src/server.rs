use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use fleet_intake::config::{AppConfig, IntakeConfig};
use fleet_intake::error::AppError;
use fleet_intake::telemetry;
use fleet_intake::workflows::intake::{
    intake_router, DirectoryUploadStore, FileStore, InMemoryStore, InMemoryUploadStore,
    IntakeService, PersistenceAdapter, ResumeChoice, SessionBootstrap, SnapshotStore, UploadStore,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

use crate::cli::ServeArgs;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

pub async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let operational = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state);

    let app = operational
        .merge(intake_routes(&config.intake))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, store = ?config.intake.store_dir, "fleet intake service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Picks file-backed stores when a store directory is configured.
fn intake_routes(config: &IntakeConfig) -> Router {
    match &config.store_dir {
        Some(dir) => session_routes(
            Arc::new(FileStore::new(dir.join("sessions"))),
            Arc::new(DirectoryUploadStore::new(dir.join("uploads"))),
            config,
        ),
        None => session_routes(
            Arc::new(InMemoryStore::new()),
            Arc::new(InMemoryUploadStore::new()),
            config,
        ),
    }
}

fn session_routes<S, U>(store: Arc<S>, uploads: Arc<U>, config: &IntakeConfig) -> Router
where
    S: SnapshotStore + 'static,
    U: UploadStore + 'static,
{
    let persistence = PersistenceAdapter::new(store, config.save_debounce);
    let bootstrap = SessionBootstrap::open(persistence);
    if bootstrap.has_prior_session() {
        info!("restoring saved intake session");
    }
    let session = bootstrap.start(ResumeChoice::Resume);
    intake_router(Arc::new(IntakeService::new(session, uploads)))
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
