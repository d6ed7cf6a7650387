use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failures raised by the service layer. Handlers translate these to HTTP
/// responses through `AppError`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("user not found")]
    UserNotFound,

    #[error("conversation not found")]
    ConversationNotFound,

    #[error("participant not found")]
    ParticipantNotFound,

    #[error("message not found")]
    MessageNotFound,

    #[error("not authorized: {0}")]
    NotAuthorized(String),

    #[error("{0}")]
    BusinessRule(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_authorized(msg: impl Into<String>) -> Self {
        Self::NotAuthorized(msg.into())
    }

    pub fn business_rule(msg: impl Into<String>) -> Self {
        Self::BusinessRule(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound
                | Self::ConversationNotFound
                | Self::ParticipantNotFound
                | Self::MessageNotFound
        )
    }
}

impl From<crate::security::PasswordError> for ServiceError {
    fn from(e: crate::security::PasswordError) -> Self {
        match e {
            crate::security::PasswordError::Weak(msg) => Self::BusinessRule(msg),
            crate::security::PasswordError::Hashing(msg) => Self::Internal(msg),
        }
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Internal(format!("background task failed: {}", e))
    }
}
