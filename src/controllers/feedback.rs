use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    domain::feedback::{FeedbackRequest, FeedbackResponse, FeedbackService},
    error::AppResult,
    infrastructure::auth::AuthUser,
};

pub struct FeedbackController {
    feedback_service: Arc<FeedbackService>,
}

impl FeedbackController {
    pub fn new(feedback_service: Arc<FeedbackService>) -> Self {
        Self { feedback_service }
    }

    /// POST /feedback - Free-text feedback from a signed-in user
    pub async fn submit(
        State(controller): State<Arc<FeedbackController>>,
        Extension(auth_user): Extension<AuthUser>,
        Json(request): Json<FeedbackRequest>,
    ) -> AppResult<Json<FeedbackResponse>> {
        controller.feedback_service.submit(auth_user.user_id, &request).await?;
        Ok(Json(FeedbackResponse { ok: true }))
    }
}
