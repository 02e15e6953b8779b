use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::intake::{AssemblyError, NavigationError, UploadError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Input(serde_json::Error),
    Navigation(NavigationError),
    Upload(UploadError),
    Assembly(AssemblyError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Input(err) => write!(f, "intake input error: {}", err),
            AppError::Navigation(err) => write!(f, "intake navigation error: {}", err),
            AppError::Upload(err) => write!(f, "upload error: {}", err),
            AppError::Assembly(err) => write!(f, "package assembly error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Input(err) => Some(err),
            AppError::Navigation(err) => Some(err),
            AppError::Upload(err) => Some(err),
            AppError::Assembly(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Input(_) | AppError::Navigation(_) | AppError::Upload(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Assembly(AssemblyError::Busy) => StatusCode::CONFLICT,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Assembly(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Input(value)
    }
}

impl From<NavigationError> for AppError {
    fn from(value: NavigationError) -> Self {
        Self::Navigation(value)
    }
}

impl From<UploadError> for AppError {
    fn from(value: UploadError) -> Self {
        Self::Upload(value)
    }
}

impl From<AssemblyError> for AppError {
    fn from(value: AssemblyError) -> Self {
        Self::Assembly(value)
    }
}
