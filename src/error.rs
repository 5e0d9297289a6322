use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Terminal outcome of a failed request. Variants map 1:1 onto response
/// statuses; 500-class causes are logged here and never leak details.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("Email already registered")]
    EmailTaken,
    #[error("User not found")]
    NotFound,
    #[error("Already verified")]
    AlreadyVerified,
    #[error("Code expired")]
    CodeExpired,
    #[error("Invalid code")]
    InvalidCode,
    #[error("No reset request found")]
    NoResetRequest,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Email not verified")]
    Unverified,
    #[error("database error")]
    Db(#[source] sqlx::Error),
    #[error("email send failed")]
    Mail(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        // A signup racing another signup for the same email loses at the
        // unique index, not at the existence check.
        if let Some(db) = err.as_database_error() {
            if db.is_unique_violation() {
                return AppError::EmailTaken;
            }
        }
        AppError::Db(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::EmailTaken => (StatusCode::CONFLICT, self.to_string()),
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::AlreadyVerified
            | AppError::CodeExpired
            | AppError::InvalidCode
            | AppError::NoResetRequest => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Unverified => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::Db(e) => {
                tracing::error!(error = %e, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".into())
            }
            AppError::Mail(e) => {
                tracing::error!(error = %e, "email send failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Email send failed".into())
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".into())
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
