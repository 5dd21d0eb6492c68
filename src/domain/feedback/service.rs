use super::{Feedback, FeedbackRequest};
use crate::{
    error::{AppError, AppResult},
    infrastructure::repositories::{FeedbackRepository, UserRepository},
};
use std::sync::Arc;
use uuid::Uuid;

pub struct FeedbackService {
    feedback_repo: Arc<FeedbackRepository>,
    user_repo: Arc<UserRepository>,
}

impl FeedbackService {
    pub fn new(feedback_repo: Arc<FeedbackRepository>, user_repo: Arc<UserRepository>) -> Self {
        Self {
            feedback_repo,
            user_repo,
        }
    }

    /// Store a note along with the submitter's email and nominal plan
    pub async fn submit(&self, user_id: Uuid, request: &FeedbackRequest) -> AppResult<Feedback> {
        let note = request.note.trim();
        if note.is_empty() {
            return Err(AppError::Validation("Note cannot be empty.".to_string()));
        }

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

        let feedback = self
            .feedback_repo
            .create(&user.email, note, &user.account_type.to_string())
            .await?;

        tracing::info!(user_id = %user.id, plan = %feedback.plan, "Feedback received");
        Ok(feedback)
    }
}
