pub mod context;
pub mod fragment;
pub mod service;

pub use context::{ContextMessage, ConversationContext};
pub use fragment::message_fragment;
pub use service::{new_response_id, ConversationService, SendMessageOutcome, SendMessageRequest};
