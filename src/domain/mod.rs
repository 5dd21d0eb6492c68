pub mod auth;
pub mod billing;
pub mod chat;
pub mod conversation;
pub mod dispatch;
pub mod feedback;
pub mod quota;
pub mod render;
pub mod stream;
pub mod user;
