use axum::{
    extract::{Query, State},
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    domain::chat::{ChatService, ChatServiceApi, Vote, VoteQuery, VoteRequest},
    error::{AppError, AppResult},
    infrastructure::auth::AuthUser,
};

pub struct VoteController {
    chat_service: Arc<ChatService>,
}

impl VoteController {
    pub fn new(chat_service: Arc<ChatService>) -> Self {
        Self { chat_service }
    }

    /// GET /api/vote?chatId= - Votes of a chat
    pub async fn list(
        State(controller): State<Arc<VoteController>>,
        Extension(auth_user): Extension<AuthUser>,
        Query(query): Query<VoteQuery>,
    ) -> AppResult<Json<Vec<Vote>>> {
        let chat_id = query
            .chat_id
            .ok_or_else(|| AppError::BadRequest("chatId is required".to_string()))?;

        let votes = controller.chat_service.list_votes(auth_user.user_id, chat_id).await?;
        Ok(Json(votes))
    }

    /// PATCH /api/vote - Up- or down-vote a message
    pub async fn vote(
        State(controller): State<Arc<VoteController>>,
        Extension(auth_user): Extension<AuthUser>,
        Json(request): Json<VoteRequest>,
    ) -> AppResult<Json<Vote>> {
        let vote = controller.chat_service.vote(auth_user.user_id, request).await?;
        Ok(Json(vote))
    }
}
