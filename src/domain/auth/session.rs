use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Signed payload carried by the session cookie
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String, // User ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat: Option<String>,
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
    pub exp: i64,
    pub iat: i64,
}

/// Decoded session state
#[derive(Debug, Clone, PartialEq)]
pub struct SessionData {
    pub user_id: Uuid,
    pub current_chat_id: Option<Uuid>,
    pub left_sidebar_open: bool,
    pub right_sidebar_open: bool,
}

impl SessionData {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            current_chat_id: None,
            left_sidebar_open: false,
            right_sidebar_open: false,
        }
    }

    pub fn with_chat(mut self, chat_id: Option<Uuid>) -> Self {
        self.current_chat_id = chat_id;
        self
    }
}

#[derive(Clone)]
pub struct SessionManager {
    secret: String,
    ttl_secs: i64,
}

impl SessionManager {
    pub fn new(secret: String, ttl_secs: i64) -> Self {
        Self { secret, ttl_secs }
    }

    /// Sign the session into a token suitable for a cookie value
    pub fn issue(&self, session: &SessionData) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.ttl_secs);

        let claims = SessionClaims {
            sub: session.user_id.to_string(),
            chat: session.current_chat_id.map(|id| id.to_string()),
            left: session.left_sidebar_open,
            right: session.right_sidebar_open,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to sign session: {}", e)))
    }

    /// Validate a session token and decode it
    pub fn validate(&self, token: &str) -> AppResult<SessionData> {
        let claims = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| AppError::Unauthorized(format!("Invalid session: {}", e)))?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user ID in session".to_string()))?;

        Ok(SessionData {
            user_id,
            current_chat_id: claims.chat.as_deref().and_then(|c| Uuid::parse_str(c).ok()),
            left_sidebar_open: claims.left,
            right_sidebar_open: claims.right,
        })
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }
}
