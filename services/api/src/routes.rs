use crate::infra::AppState;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use jobboard::board::{
    bearer_token, job_board_router, ApplicationRepository, JobBoardService, JobRepository,
    UserRepository,
};
use jobboard::error::AppError;
use jobboard::screening::PageTextSource;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

pub(crate) fn with_job_board_routes<U, J, A, S>(
    service: Arc<JobBoardService<U, J, A, S>>,
    max_upload_bytes: usize,
) -> Router
where
    U: UserRepository + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    S: PageTextSource + 'static,
{
    let uploads = Router::new()
        .route(
            "/api/v1/uploads/:filename",
            get(download_resume::<U, J, A, S>),
        )
        .with_state(service.clone());

    job_board_router(service, max_upload_bytes)
        .merge(uploads)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
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

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Serve a stored resume to any signed-in user.
pub(crate) async fn download_resume<U, J, A, S>(
    State(service): State<Arc<JobBoardService<U, J, A, S>>>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError>
where
    U: UserRepository + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    S: PageTextSource + 'static,
{
    let session = service.authenticate(bearer_token(&headers))?;
    let path = service.resume_path(&session, &filename)?;
    let bytes = tokio::fs::read(&path).await?;
    let content_type = mime_guess::from_path(&path).first_or_octet_stream();

    debug!(%filename, requested_by = %session.username, "resume downloaded");
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type.essence_str().to_string())],
        bytes,
    )
        .into_response())
}
