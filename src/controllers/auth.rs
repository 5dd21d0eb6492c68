use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::{
    domain::auth::{AuthService, AuthServiceApi, CredentialsRequest, SessionData, SessionResponse},
    domain::user::User,
    error::AppResult,
    infrastructure::auth::SessionCookies,
};

pub struct AuthController {
    auth_service: Arc<AuthService>,
    cookies: Arc<SessionCookies>,
}

impl AuthController {
    pub fn new(auth_service: Arc<AuthService>, cookies: Arc<SessionCookies>) -> Self {
        Self {
            auth_service,
            cookies,
        }
    }

    /// POST /register - Create an account and start a session
    pub async fn register(
        State(controller): State<Arc<AuthController>>,
        jar: CookieJar,
        Json(request): Json<CredentialsRequest>,
    ) -> AppResult<(StatusCode, CookieJar, Json<SessionResponse>)> {
        let user = controller.auth_service.register(&request).await?;
        let (jar, body) = controller.start_session(jar, &user)?;
        Ok((StatusCode::CREATED, jar, body))
    }

    /// POST /login - Check credentials and start a session
    pub async fn login(
        State(controller): State<Arc<AuthController>>,
        jar: CookieJar,
        Json(request): Json<CredentialsRequest>,
    ) -> AppResult<(CookieJar, Json<SessionResponse>)> {
        let user = controller.auth_service.login(&request).await?;
        tracing::info!(user_id = %user.id, "User logged in");
        controller.start_session(jar, &user)
    }

    /// GET|POST /logout - Drop the session cookie
    pub async fn logout(
        State(controller): State<Arc<AuthController>>,
        jar: CookieJar,
    ) -> (CookieJar, StatusCode) {
        (controller.cookies.clear(jar), StatusCode::NO_CONTENT)
    }

    fn start_session(&self, jar: CookieJar, user: &User) -> AppResult<(CookieJar, Json<SessionResponse>)> {
        let jar = self.cookies.issue(jar, &SessionData::new(user.id))?;
        Ok((
            jar,
            Json(SessionResponse {
                user_id: user.id,
                email: user.email.clone(),
                account_type: user.account_type.to_string(),
            }),
        ))
    }
}
