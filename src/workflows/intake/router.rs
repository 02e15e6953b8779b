use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::domain::MAX_UPLOAD_BYTES;
use super::gate::{NavigationError, Transition};
use super::package::AssemblyError;
use super::persistence::SnapshotStore;
use super::service::{IntakeService, IntakeServiceError};
use super::session::FieldAccessError;
use super::uploads::{UploadError, UploadStore};

/// Router exposing the intake session under `/api/v1/intake`.
pub fn intake_router<S, U>(service: Arc<IntakeService<S, U>>) -> Router
where
    S: SnapshotStore + 'static,
    U: UploadStore + 'static,
{
    let upload_limit = usize::try_from(MAX_UPLOAD_BYTES).unwrap_or(usize::MAX).saturating_add(1);
    Router::new()
        .route("/api/v1/intake", get(session_handler::<S, U>))
        .route("/api/v1/intake/fields", put(set_field_handler::<S, U>))
        .route("/api/v1/intake/advance", post(advance_handler::<S, U>))
        .route("/api/v1/intake/retreat", post(retreat_handler::<S, U>))
        .route("/api/v1/intake/jump/:stage", post(jump_handler::<S, U>))
        .route("/api/v1/intake/errors", get(errors_handler::<S, U>))
        .route(
            "/api/v1/intake/documents",
            post(upload_handler::<S, U>).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/v1/intake/package", get(package_handler::<S, U>))
        .route("/api/v1/intake/restart", post(restart_handler::<S, U>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct SetFieldRequest {
    path: String,
    value: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadQuery {
    #[serde(rename = "type")]
    document_type: String,
    file_name: String,
    mime_type: String,
}

pub(crate) async fn session_handler<S, U>(State(service): State<Arc<IntakeService<S, U>>>) -> Response
where
    S: SnapshotStore + 'static,
    U: UploadStore + 'static,
{
    (StatusCode::OK, Json(service.view())).into_response()
}

pub(crate) async fn set_field_handler<S, U>(
    State(service): State<Arc<IntakeService<S, U>>>,
    Json(request): Json<SetFieldRequest>,
) -> Response
where
    S: SnapshotStore + 'static,
    U: UploadStore + 'static,
{
    match service.set_field(&request.path, request.value) {
        Ok(stage) => (StatusCode::OK, Json(stage)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn advance_handler<S, U>(State(service): State<Arc<IntakeService<S, U>>>) -> Response
where
    S: SnapshotStore + 'static,
    U: UploadStore + 'static,
{
    match service.advance() {
        Ok((transition, stage)) => {
            let submitted = transition == Transition::Submitted;
            let payload = json!({
                "submitted": submitted,
                "stage": stage,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn retreat_handler<S, U>(State(service): State<Arc<IntakeService<S, U>>>) -> Response
where
    S: SnapshotStore + 'static,
    U: UploadStore + 'static,
{
    match service.retreat() {
        Ok(stage) => (StatusCode::OK, Json(stage)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn jump_handler<S, U>(
    State(service): State<Arc<IntakeService<S, U>>>,
    Path(stage): Path<u8>,
) -> Response
where
    S: SnapshotStore + 'static,
    U: UploadStore + 'static,
{
    match service.jump_to(stage) {
        Ok(stage) => (StatusCode::OK, Json(stage)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn errors_handler<S, U>(State(service): State<Arc<IntakeService<S, U>>>) -> Response
where
    S: SnapshotStore + 'static,
    U: UploadStore + 'static,
{
    let stage = service.stage();
    let errors = service.errors();
    let payload = json!({
        "stage": stage.current,
        "valid": errors.is_empty(),
        "errors": errors,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn upload_handler<S, U>(
    State(service): State<Arc<IntakeService<S, U>>>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Response
where
    S: SnapshotStore + 'static,
    U: UploadStore + 'static,
{
    match service.register_upload(&query.document_type, &query.file_name, &query.mime_type, body.to_vec()) {
        Ok(document) => (StatusCode::CREATED, Json(document)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn package_handler<S, U>(State(service): State<Arc<IntakeService<S, U>>>) -> Response
where
    S: SnapshotStore + 'static,
    U: UploadStore + 'static,
{
    match service.package().await {
        Ok(package) => {
            let headers = [
                (header::CONTENT_TYPE, "application/gzip".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", package.file_name),
                ),
            ];
            (StatusCode::OK, headers, package.bytes).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn restart_handler<S, U>(State(service): State<Arc<IntakeService<S, U>>>) -> Response
where
    S: SnapshotStore + 'static,
    U: UploadStore + 'static,
{
    (StatusCode::OK, Json(service.restart())).into_response()
}

fn status_for(error: &IntakeServiceError) -> StatusCode {
    match error {
        IntakeServiceError::Field(FieldAccessError::Serialization(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        IntakeServiceError::Field(FieldAccessError::Locked(_)) => StatusCode::CONFLICT,
        IntakeServiceError::Field(_) => StatusCode::BAD_REQUEST,
        IntakeServiceError::Navigation(NavigationError::Invalid { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
        IntakeServiceError::Navigation(NavigationError::OutOfRange(_)) => StatusCode::BAD_REQUEST,
        IntakeServiceError::Navigation(_) => StatusCode::CONFLICT,
        IntakeServiceError::Upload(UploadError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
        IntakeServiceError::Upload(UploadError::UnsupportedFormat(_)) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        IntakeServiceError::Upload(UploadError::Empty | UploadError::MissingName) => StatusCode::BAD_REQUEST,
        IntakeServiceError::Upload(_) => StatusCode::INTERNAL_SERVER_ERROR,
        IntakeServiceError::UnknownDocumentType(_) => StatusCode::BAD_REQUEST,
        IntakeServiceError::NotSubmitted => StatusCode::CONFLICT,
        IntakeServiceError::Assembly(AssemblyError::Busy) => StatusCode::CONFLICT,
        IntakeServiceError::Assembly(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: IntakeServiceError) -> Response {
    let status = status_for(&error);
    let payload = match &error {
        IntakeServiceError::Navigation(NavigationError::Invalid { stage, errors }) => json!({
            "error": error.to_string(),
            "stage": stage.number(),
            "errors": errors,
        }),
        _ => json!({
            "error": error.to_string(),
        }),
    };
    (status, Json(payload)).into_response()
}
