use super::{Chat, Message};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct ChatDetailResponse {
    pub chat: Chat,
    pub messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteQuery {
    pub chat_id: Option<Uuid>,
}

/// Body for PATCH /api/vote
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub chat_id: Option<Uuid>,
    pub message_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub vote_type: Option<String>,
}
