use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use firstlink_core::AdminError;
use firstlink_redirector::RedirectorError;
use thiserror::Error;
use tracing::error;

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("redirect not found")]
    RedirectNotFound,
    #[error("missing required fields")]
    MissingFields,
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid slug: {0}")]
    InvalidSlug(String),
    #[error("slug already exists: {0}")]
    SlugConflict(String),
    #[error("malformed request body: {0}")]
    InvalidBody(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::RedirectNotFound => (StatusCode::NOT_FOUND, "Redirect not found"),
            AppError::MissingFields => (
                StatusCode::BAD_REQUEST,
                "Missing required fields: slug, firstUrl, nextUrl",
            ),
            AppError::InvalidUrl(_) => (StatusCode::BAD_REQUEST, "Invalid URL format"),
            AppError::InvalidSlug(_) => (StatusCode::BAD_REQUEST, "Invalid slug format"),
            AppError::SlugConflict(_) => (StatusCode::CONFLICT, "Slug already exists"),
            AppError::InvalidBody(_) => (StatusCode::BAD_REQUEST, "Invalid request body"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

impl From<RedirectorError> for AppError {
    fn from(value: RedirectorError) -> Self {
        match value {
            RedirectorError::NotFound(_) => AppError::RedirectNotFound,
            RedirectorError::Storage(err) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<AdminError> for AppError {
    fn from(value: AdminError) -> Self {
        match value {
            AdminError::MissingFields => AppError::MissingFields,
            AdminError::InvalidUrl(message) => AppError::InvalidUrl(message),
            AdminError::InvalidSlug(message) => AppError::InvalidSlug(message),
            AdminError::Conflict(slug) => AppError::SlugConflict(slug),
            AdminError::NotFound(_) => AppError::RedirectNotFound,
            AdminError::Storage(message) => AppError::Internal(message),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(value: JsonRejection) -> Self {
        AppError::InvalidBody(value.body_text())
    }
}
