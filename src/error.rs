// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::db::StoreError;
use crate::services::assistant::AssistantError;
use crate::services::firebase_auth::AuthError;
use crate::services::upload::UploadError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    /// Verifier message, surfaced to the client verbatim.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Auth provider unavailable")]
    AuthUnavailable,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Rejected(msg) => AppError::InvalidToken(msg),
            AuthError::Transient(msg) => {
                tracing::error!(error = %msg, "Token verification unavailable");
                AppError::AuthUnavailable
            }
        }
    }
}

impl From<AssistantError> for AppError {
    fn from(err: AssistantError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken(msg) => {
                (StatusCode::UNAUTHORIZED, "invalid_token", Some(msg.clone()))
            }
            AppError::AuthUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "auth_unavailable",
                Some("Sign-in is temporarily unavailable, please retry".to_string()),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Store(err) => {
                tracing::error!(error = %err, "Store error");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "store_unavailable",
                    Some("Could not reach the database, please retry".to_string()),
                )
            }
            AppError::Upload(err) => upload_status(err),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

fn upload_status(err: &UploadError) -> (StatusCode, &'static str, Option<String>) {
    match err {
        UploadError::TooLarge { .. } => (
            StatusCode::PAYLOAD_TOO_LARGE,
            "image_too_large",
            Some(err.to_string()),
        ),
        UploadError::UnsupportedType(_) => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "unsupported_media_type",
            Some(err.to_string()),
        ),
        UploadError::Empty => (StatusCode::BAD_REQUEST, "bad_request", Some(err.to_string())),
        UploadError::Transport(msg) => {
            tracing::error!(error = %msg, "Upload transport error");
            (
                StatusCode::BAD_GATEWAY,
                "upload_failed",
                Some("Upload failed, please try again".to_string()),
            )
        }
        UploadError::Store(store) => {
            tracing::error!(error = %store, "Store error after upload");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "store_unavailable",
                Some("Could not reach the database, please retry".to_string()),
            )
        }
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
