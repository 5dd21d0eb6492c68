use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("{0}")]
    Invalid(String),
    #[error("User already exists")]
    AlreadyExists,
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<AppError> for AuthServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Conflict(_) => AuthServiceError::AlreadyExists,
            AppError::Unauthorized(msg) => AuthServiceError::Unauthorized(msg),
            AppError::Validation(msg) => AuthServiceError::Invalid(msg),
            _ => AuthServiceError::Dependency(err.to_string()),
        }
    }
}

impl From<AuthServiceError> for AppError {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::Invalid(msg) => AppError::Validation(msg),
            AuthServiceError::AlreadyExists => AppError::Conflict("User already exists".to_string()),
            AuthServiceError::Unauthorized(msg) => AppError::Unauthorized(msg),
            AuthServiceError::Dependency(msg) => AppError::Internal(msg),
            AuthServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
