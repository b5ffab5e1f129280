use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::users::{password::HashError, repo::RepoError};

/// Failure kinds returned by the account service.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("user already exists")]
    Conflict,
    #[error("user not found")]
    NotFound,
    /// Unknown identifier and wrong password are deliberately the same variant.
    #[error("invalid email/username or password")]
    InvalidCredentials,
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl AccountError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict => "CONFLICT",
            Self::NotFound => "NOT_FOUND",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict => StatusCode::CONFLICT,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing text. Store and hashing details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Conflict => "User already exists".into(),
            Self::NotFound => "User not found".into(),
            Self::InvalidCredentials => "Invalid email/username or password".into(),
            Self::Internal(_) => "Internal server error".into(),
        }
    }
}

impl From<RepoError> for AccountError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::AlreadyExists => Self::Conflict,
            RepoError::NotFound => Self::NotFound,
            other => Self::internal(other),
        }
    }
}

impl From<HashError> for AccountError {
    fn from(e: HashError) -> Self {
        Self::internal(e)
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        if let Self::Internal(source) = &self {
            error!(error = %format!("{source:#}"), "request failed");
        }
        let body = ErrorBody {
            error: self.kind(),
            message: self.public_message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
