use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Main service error type
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Preset store error")]
    Preset(#[from] PresetError),

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Preset document store errors
#[derive(Error, Debug)]
pub enum PresetError {
    #[error("Preset config not found at {}", path.display())]
    Missing { path: PathBuf },

    #[error("Failed to read preset config at {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Preset config at {} is not valid JSON", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write preset config at {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Update key path must not be empty")]
    InvalidKeyPath,

    #[error("Cannot descend through \"{key}\": existing value is not an object")]
    KeyPathConflict { key: String },
}

/// API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Preset(PresetError::InvalidKeyPath)
            | ServiceError::Preset(PresetError::KeyPathConflict { .. })
            | ServiceError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Preset(PresetError::Missing { .. }) => "preset_config_missing",
            ServiceError::Preset(PresetError::Read { .. }) => "preset_config_read",
            ServiceError::Preset(PresetError::Corrupt { .. }) => "preset_config_corrupt",
            ServiceError::Preset(PresetError::Write { .. }) => "preset_config_write",
            ServiceError::Preset(PresetError::InvalidKeyPath) => "invalid_key_path",
            ServiceError::Preset(PresetError::KeyPathConflict { .. }) => "key_path_conflict",
            ServiceError::InvalidRequest { .. } => "invalid_request",
            ServiceError::Config { .. } => "config_error",
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code().to_string();

        // Surface the most specific message, not the wrapper's
        let message = match &self {
            ServiceError::Preset(e) => e.to_string(),
            _ => self.to_string(),
        };

        let response = ErrorResponse {
            message,
            code: Some(code),
        };

        (status, Json(response)).into_response()
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result type alias for preset store operations
pub type PresetResult<T> = Result<T, PresetError>;
