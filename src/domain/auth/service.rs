use super::{
    error::AuthServiceError,
    password::{hash_password, verify_password},
    CredentialsRequest,
};
use crate::{domain::user::User, infrastructure::repositories::UserRepository};
use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, OnceLock};

pub const MIN_PASSWORD_LENGTH: usize = 8;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@]+@[^@]+\.[^@]+$").expect("valid email regex"))
}

pub struct AuthService {
    user_repo: Arc<UserRepository>,
}

impl AuthService {
    pub fn new(user_repo: Arc<UserRepository>) -> Self {
        Self { user_repo }
    }
}

#[async_trait]
pub trait AuthServiceApi: Send + Sync {
    /// Create an account on the free tier
    async fn register(&self, credentials: &CredentialsRequest) -> Result<User, AuthServiceError>;

    /// Check credentials, returning the user on success
    async fn login(&self, credentials: &CredentialsRequest) -> Result<User, AuthServiceError>;
}

#[async_trait]
impl AuthServiceApi for AuthService {
    async fn register(&self, credentials: &CredentialsRequest) -> Result<User, AuthServiceError> {
        let email = normalize_email(&credentials.email);
        validate_credentials(&email, &credentials.password)?;

        let password_hash = hash_password(&credentials.password)?;
        let user = self.user_repo.create(&email, &password_hash).await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    async fn login(&self, credentials: &CredentialsRequest) -> Result<User, AuthServiceError> {
        let email = normalize_email(&credentials.email);
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AuthServiceError::Unauthorized("Invalid email or password".to_string()))?;

        if !verify_password(&credentials.password, &user.password_hash) {
            tracing::warn!(user_id = %user.id, "Failed login attempt");
            return Err(AuthServiceError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        }

        Ok(user)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_credentials(email: &str, password: &str) -> Result<(), AuthServiceError> {
    if !email_pattern().is_match(email) {
        return Err(AuthServiceError::Invalid("Email is invalid".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthServiceError::Invalid(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}
