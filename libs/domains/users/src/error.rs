use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, FieldErrors};
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::rules::messages;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(Uuid),

    #[error("User with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Operation rejected: {0}")]
    Rejected(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => AppError::NotFound("User not found".to_string()),
            // A uniqueness race that slipped past validation reads like the validation failure.
            UserError::DuplicateEmail(_) => AppError::Validation(FieldErrors::single(
                "email",
                messages::EMAIL_UNIQUE,
            )),
            UserError::InvalidCredentials => {
                AppError::Unauthorized("Invalid credentials".to_string())
            }
            UserError::Validation(errors) => AppError::Validation(errors),
            UserError::Rejected(reason) => AppError::Forbidden(reason),
            UserError::PasswordHash(detail) => AppError::InternalServerError(detail),
            UserError::Database(e) => AppError::Database(e),
            UserError::Internal(detail) => AppError::InternalServerError(detail),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
