use crate::domain::chat::{Message, MessageRole};
use uuid::Uuid;

/// Prior turns sent to the model along with a new message
pub const MAX_HISTORY_MESSAGES: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct ContextMessage {
    pub role: MessageRole,
    pub text: String,
}

/// Explicit per-call conversation state: the chat and its prior messages
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationContext {
    pub chat_id: Uuid,
    pub history: Vec<ContextMessage>,
}

impl ConversationContext {
    pub fn empty(chat_id: Uuid) -> Self {
        Self {
            chat_id,
            history: Vec::new(),
        }
    }

    /// Keep the most recent non-empty messages, oldest first
    pub fn from_messages(chat_id: Uuid, messages: &[Message]) -> Self {
        let mut history: Vec<ContextMessage> = messages
            .iter()
            .rev()
            .filter_map(|message| {
                let text = message.text();
                (!text.trim().is_empty()).then(|| ContextMessage {
                    role: message.role,
                    text,
                })
            })
            .take(MAX_HISTORY_MESSAGES)
            .collect();
        history.reverse();

        Self { chat_id, history }
    }
}
