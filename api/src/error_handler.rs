use ai_llm_service::AiLlmError;
use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::FormRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::{ServiceError, UploadError};
use thiserror::Error;
use tracing::{error, warn};

use crate::core::{app_state::ConfigError, http::response_envelope::ErrorBody};

/// Public application error type.
///
/// Every variant renders as `{ "detail": message }`.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Config(#[from] ConfigError),

    // --- IO / network / server ---
    #[error("failed to bind listener: {0}")]
    Bind(#[source] std::io::Error),

    #[error("server error: {0}")]
    Server(#[source] std::io::Error),

    // --- Request / form ---
    #[error("field required: {0}")]
    MissingField(&'static str),

    /// The body could not be read as a form.
    #[error("{message}")]
    InvalidForm { status: StatusCode, message: String },

    // --- Downstream ---
    #[error(transparent)]
    Llm(#[from] AiLlmError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingField(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidForm { status, .. } => *status,

            AppError::Config(_)
            | AppError::Bind(_)
            | AppError::Server(_)
            | AppError::Llm(_)
            | AppError::Upload(_)
            | AppError::Service(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(%status, error = %self, "request failed");
        } else {
            warn!(%status, error = %self, "request rejected");
        }
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<MultipartRejection> for AppError {
    fn from(err: MultipartRejection) -> Self {
        AppError::InvalidForm {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::InvalidForm {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl From<FormRejection> for AppError {
    fn from(err: FormRejection) -> Self {
        AppError::InvalidForm {
            status: err.status(),
            message: err.body_text(),
        }
    }
}
