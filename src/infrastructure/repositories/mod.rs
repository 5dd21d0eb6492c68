pub mod chat_repository;
pub mod feedback_repository;
pub mod message_repository;
pub mod stream_repository;
pub mod user_repository;
pub mod vote_repository;

pub use chat_repository::ChatRepository;
pub use feedback_repository::FeedbackRepository;
pub use message_repository::MessageRepository;
pub use stream_repository::StreamRepository;
pub use user_repository::UserRepository;
pub use vote_repository::VoteRepository;
