use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::session_cookie::SessionCookies;
use crate::{
    domain::auth::SessionData, error::AppError, infrastructure::repositories::UserRepository,
};
use uuid::Uuid;

/// User context injected into request extensions after authentication
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub session: SessionData,
}

/// Session middleware: requires a valid session cookie for an existing user
pub async fn session_middleware(
    State((user_repo, cookies)): State<(Arc<UserRepository>, Arc<SessionCookies>)>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session = cookies
        .read(request.headers())?
        .ok_or_else(|| AppError::Unauthorized("Missing session".to_string()))?;

    // Verify user still exists
    let user = user_repo
        .find_by_id(session.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    request.extensions_mut().insert(AuthUser {
        user_id: user.id,
        email: user.email,
        session,
    });

    Ok(next.run(request).await)
}
