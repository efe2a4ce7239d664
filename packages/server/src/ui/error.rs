//! HTTP error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    domain::{AccessDenied, FirmwareError},
    usecase::{FirmwareUploadError, RegisterError, RelayCommandError},
};

use super::body::DrainError;

/// Error returned by a handler, rendered as a plain-text body
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Unauthorized(#[from] AccessDenied),

    #[error("Request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("Malformed request: {0}")]
    Malformed(String),

    #[error(transparent)]
    CapacityExceeded(#[from] RegisterError),

    #[error("{0}")]
    Io(String),

    #[error("Relay control failed: {0}")]
    Relay(String),

    #[error("Firmware update failed: {0}")]
    Firmware(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::FORBIDDEN,
            Self::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Malformed(_) => StatusCode::BAD_REQUEST,
            Self::CapacityExceeded(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Io(_) | Self::Firmware(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Relay(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<DrainError> for ApiError {
    fn from(e: DrainError) -> Self {
        match e {
            DrainError::TooLarge { limit } => Self::BodyTooLarge { limit },
            DrainError::TimedOut { .. } | DrainError::Io(_) => Self::Io(e.to_string()),
        }
    }
}

impl From<RelayCommandError> for ApiError {
    fn from(e: RelayCommandError) -> Self {
        match e {
            RelayCommandError::Invalid(e) => Self::Malformed(e.to_string()),
            RelayCommandError::Relay(e) => Self::Relay(e.to_string()),
        }
    }
}

impl From<FirmwareUploadError> for ApiError {
    fn from(e: FirmwareUploadError) -> Self {
        match e {
            FirmwareUploadError::Firmware(FirmwareError::EmptyImage) => {
                Self::Malformed(e.to_string())
            }
            FirmwareUploadError::Firmware(FirmwareError::Rejected(_)) => {
                Self::Firmware(e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("Request rejected ({}): {}", status, self);
        }
        (status, self.to_string()).into_response()
    }
}
