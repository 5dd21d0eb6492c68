use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Caller's tier is below the model's tier
    #[error("{0}")]
    Forbidden(String),
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Forbidden(msg) => AppError::Forbidden(msg),
        }
    }
}
