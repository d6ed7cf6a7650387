use crate::services::ServiceError;
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server start failure: {0}")]
    StartServer(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl AppError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Service(e) => match e {
                ServiceError::UserNotFound => "USER_NOT_FOUND",
                ServiceError::ConversationNotFound => "CONVERSATION_NOT_FOUND",
                ServiceError::ParticipantNotFound => "PARTICIPANT_NOT_FOUND",
                ServiceError::MessageNotFound => "MESSAGE_NOT_FOUND",
                ServiceError::NotAuthorized(_) => "NOT_AUTHORIZED",
                ServiceError::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
                ServiceError::Conflict(_) => "CONFLICT",
                ServiceError::InvalidCredentials => "LOGIN_BAD_CREDENTIALS",
                ServiceError::Database(_) => "DATABASE_ERROR",
                ServiceError::Internal(_) => "INTERNAL_ERROR",
            },
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Token(_) => "TOKEN_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::StartServer(_) => "SERVER_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Text shown to the client. Server-side failures stay generic.
    fn public_message(&self) -> String {
        match self {
            AppError::Service(ServiceError::NotAuthorized(msg))
            | AppError::Service(ServiceError::BusinessRule(msg))
            | AppError::Service(ServiceError::Conflict(msg)) => msg.clone(),
            AppError::Validation(msg) | AppError::BadRequest(msg) | AppError::Unauthorized(msg) => {
                msg.clone()
            }
            e if e.status_code().is_server_error() => "Internal server error".to_string(),
            e => e.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Service(e) => match e {
                e if e.is_not_found() => StatusCode::NOT_FOUND,
                ServiceError::NotAuthorized(_) => StatusCode::FORBIDDEN,
                ServiceError::BusinessRule(_) | ServiceError::InvalidCredentials => {
                    StatusCode::BAD_REQUEST
                }
                ServiceError::Conflict(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Token(_)
            | AppError::Config(_)
            | AppError::StartServer(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        HttpResponse::build(status_code).json(ErrorResponse {
            error: self.code(),
            message: self.public_message(),
        })
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}
