pub mod auth;
pub mod billing;
pub mod chat;
pub mod feedback;
pub mod health;
pub mod seo;
pub mod session;
pub mod stream;
pub mod vote;
