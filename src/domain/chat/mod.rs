pub mod dto;
pub mod error;
pub mod grouping;
pub mod model;
pub mod service;

pub use dto::{ChatDetailResponse, VoteQuery, VoteRequest};
pub use error::ChatServiceError;
pub use grouping::{group_by_recency, ChatGroups};
pub use model::{title_from_message, Chat, ChatVisibility, Message, MessagePart, MessageRole, Vote};
pub use service::{ChatService, ChatServiceApi};
