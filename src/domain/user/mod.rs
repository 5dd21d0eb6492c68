pub mod dto;
pub mod error;
pub mod model;
pub mod service;

pub use dto::{ProfileResponse, RequestInfo};
pub use error::UserServiceError;
pub use model::{effective_tier, AccountTier, User};
pub use service::{UserService, UserServiceApi};
