pub mod dto;
pub mod error;
pub mod password;
pub mod service;
pub mod session;

pub use dto::{CredentialsRequest, SessionResponse, SidebarResponse};
pub use error::AuthServiceError;
pub use service::{AuthService, AuthServiceApi};
pub use session::{SessionClaims, SessionData, SessionManager};
