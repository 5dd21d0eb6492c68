use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body for POST /login and POST /register
#[derive(Debug, Serialize, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user_id: Uuid,
    pub email: String,
    pub account_type: String,
}

/// Sidebar state after a toggle
#[derive(Debug, Serialize, Deserialize)]
pub struct SidebarResponse {
    pub left_sidebar_open: bool,
    pub right_sidebar_open: bool,
}
