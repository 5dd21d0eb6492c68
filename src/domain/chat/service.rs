use super::{
    dto::{ChatDetailResponse, VoteRequest},
    error::ChatServiceError,
    grouping::{group_by_recency, ChatGroups},
    Chat, Vote,
};
use crate::infrastructure::repositories::{ChatRepository, MessageRepository, VoteRepository};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub struct ChatService {
    chat_repo: Arc<ChatRepository>,
    message_repo: Arc<MessageRepository>,
    vote_repo: Arc<VoteRepository>,
}

impl ChatService {
    pub fn new(
        chat_repo: Arc<ChatRepository>,
        message_repo: Arc<MessageRepository>,
        vote_repo: Arc<VoteRepository>,
    ) -> Self {
        Self {
            chat_repo,
            message_repo,
            vote_repo,
        }
    }
}

#[async_trait]
pub trait ChatServiceApi: Send + Sync {
    /// The user's chats grouped by recency
    async fn history(&self, user_id: Uuid) -> Result<ChatGroups, ChatServiceError>;

    /// A chat with its messages, only if owned by the user
    async fn show(&self, user_id: Uuid, chat_id: Uuid) -> Result<ChatDetailResponse, ChatServiceError>;

    /// Delete an owned chat and return the refreshed history
    async fn delete(&self, user_id: Uuid, chat_id: Uuid) -> Result<ChatGroups, ChatServiceError>;

    async fn list_votes(&self, user_id: Uuid, chat_id: Uuid) -> Result<Vec<Vote>, ChatServiceError>;

    async fn vote(&self, user_id: Uuid, request: VoteRequest) -> Result<Vote, ChatServiceError>;
}

#[async_trait]
impl ChatServiceApi for ChatService {
    async fn history(&self, user_id: Uuid) -> Result<ChatGroups, ChatServiceError> {
        let chats = self.chat_repo.find_by_user(user_id).await?;
        Ok(group_by_recency(chats, Utc::now().date_naive()))
    }

    async fn show(&self, user_id: Uuid, chat_id: Uuid) -> Result<ChatDetailResponse, ChatServiceError> {
        let chat = self.owned_chat(user_id, chat_id).await?;
        let messages = self.message_repo.find_by_chat(chat.id).await?;

        Ok(ChatDetailResponse { chat, messages })
    }

    async fn delete(&self, user_id: Uuid, chat_id: Uuid) -> Result<ChatGroups, ChatServiceError> {
        if !self.chat_repo.delete(chat_id, user_id).await? {
            return Err(ChatServiceError::NotFound);
        }
        tracing::info!(user_id = %user_id, chat_id = %chat_id, "Chat deleted");

        self.history(user_id).await
    }

    async fn list_votes(&self, user_id: Uuid, chat_id: Uuid) -> Result<Vec<Vote>, ChatServiceError> {
        self.owned_chat(user_id, chat_id).await?;
        Ok(self.vote_repo.find_by_chat(chat_id).await?)
    }

    async fn vote(&self, user_id: Uuid, request: VoteRequest) -> Result<Vote, ChatServiceError> {
        let (chat_id, message_id, vote_type) =
            match (request.chat_id, request.message_id, request.vote_type) {
                (Some(chat_id), Some(message_id), Some(vote_type)) => (chat_id, message_id, vote_type),
                _ => {
                    return Err(ChatServiceError::Invalid(
                        "chatId, messageId and type are required".to_string(),
                    ))
                }
            };
        let is_upvoted = parse_vote_type(&vote_type)?;

        self.owned_chat(user_id, chat_id).await?;
        let vote = self.vote_repo.upsert(chat_id, message_id, is_upvoted).await?;

        Ok(vote)
    }
}

impl ChatService {
    async fn owned_chat(&self, user_id: Uuid, chat_id: Uuid) -> Result<Chat, ChatServiceError> {
        self.chat_repo
            .find_by_id(chat_id)
            .await?
            .filter(|chat| chat.user_id == user_id)
            .ok_or(ChatServiceError::NotFound)
    }
}

fn parse_vote_type(value: &str) -> Result<bool, ChatServiceError> {
    match value {
        "up" => Ok(true),
        "down" => Ok(false),
        other => Err(ChatServiceError::Invalid(format!(
            "Vote type must be 'up' or 'down', got '{}'",
            other
        ))),
    }
}
