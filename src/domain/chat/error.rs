use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum ChatServiceError {
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("chat not found")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<AppError> for ChatServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) => ChatServiceError::Invalid(msg),
            AppError::NotFound(_) => ChatServiceError::NotFound,
            _ => ChatServiceError::Dependency(err.to_string()),
        }
    }
}

impl From<ChatServiceError> for AppError {
    fn from(err: ChatServiceError) -> Self {
        match err {
            ChatServiceError::Invalid(msg) => AppError::BadRequest(msg),
            ChatServiceError::NotFound => AppError::NotFound("Chat not found".to_string()),
            ChatServiceError::Dependency(msg) => AppError::Internal(msg),
            ChatServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
