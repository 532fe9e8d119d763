use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `TOKEN_MISSING`,
    /// `TOKEN_INVALID`, `INVALID_CREDENTIALS`, `PERMISSION_DENIED`, `NOT_FOUND`,
    /// `CONFLICT`, `EMAIL_TAKEN`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Weight exceeds the remaining allocation of 25%")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    TokenMissing,
    TokenInvalid,
    InvalidCredentials,
    PermissionDenied,
    NotFound(String),
    Conflict(String),
    EmailTaken,
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::TokenMissing | Self::TokenInvalid | Self::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) | Self::EmailTaken => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::TokenMissing => "TOKEN_MISSING",
            Self::TokenInvalid => "TOKEN_INVALID",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn into_body(self) -> ErrorBody {
        let code = self.code();
        let message = match self {
            Self::Validation(msg) | Self::NotFound(msg) | Self::Conflict(msg) => msg,
            Self::TokenMissing => "Authentication required".into(),
            Self::TokenInvalid => "Invalid or expired token".into(),
            Self::InvalidCredentials => "Invalid email or password".into(),
            Self::PermissionDenied => "Insufficient permissions".into(),
            Self::EmailTaken => "Email is already registered".into(),
            Self::Internal(detail) => {
                tracing::error!(%detail, "Internal error");
                "An unexpected error occurred".into()
            }
        };
        ErrorBody { code, message }
    }

    /// Map a unique-constraint violation to `Conflict(msg)`, anything else to `Internal`.
    pub fn conflict_on_unique(err: DbErr, msg: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::Conflict(msg.to_string()),
            _ => Self::from(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.into_body())).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        Self::Internal(err.to_string())
    }
}
