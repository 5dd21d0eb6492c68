use axum::{extract::State, Extension, Json};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::{
    domain::auth::{SessionData, SidebarResponse},
    error::AppResult,
    infrastructure::auth::{AuthUser, SessionCookies},
};

/// Sidebar flags kept in the session cookie
pub struct SessionController {
    cookies: Arc<SessionCookies>,
}

impl SessionController {
    pub fn new(cookies: Arc<SessionCookies>) -> Self {
        Self { cookies }
    }

    /// POST /toggle-left-sidebar
    pub async fn toggle_left_sidebar(
        State(controller): State<Arc<SessionController>>,
        Extension(auth_user): Extension<AuthUser>,
        jar: CookieJar,
    ) -> AppResult<(CookieJar, Json<SidebarResponse>)> {
        let mut session = auth_user.session;
        session.left_sidebar_open = !session.left_sidebar_open;
        controller.save(jar, session)
    }

    /// POST /close-left-sidebar
    pub async fn close_left_sidebar(
        State(controller): State<Arc<SessionController>>,
        Extension(auth_user): Extension<AuthUser>,
        jar: CookieJar,
    ) -> AppResult<(CookieJar, Json<SidebarResponse>)> {
        let mut session = auth_user.session;
        session.left_sidebar_open = false;
        controller.save(jar, session)
    }

    /// POST /toggle-right-sidebar
    pub async fn toggle_right_sidebar(
        State(controller): State<Arc<SessionController>>,
        Extension(auth_user): Extension<AuthUser>,
        jar: CookieJar,
    ) -> AppResult<(CookieJar, Json<SidebarResponse>)> {
        let mut session = auth_user.session;
        session.right_sidebar_open = !session.right_sidebar_open;
        controller.save(jar, session)
    }

    /// POST /close-right-sidebar
    pub async fn close_right_sidebar(
        State(controller): State<Arc<SessionController>>,
        Extension(auth_user): Extension<AuthUser>,
        jar: CookieJar,
    ) -> AppResult<(CookieJar, Json<SidebarResponse>)> {
        let mut session = auth_user.session;
        session.right_sidebar_open = false;
        controller.save(jar, session)
    }

    fn save(&self, jar: CookieJar, session: SessionData) -> AppResult<(CookieJar, Json<SidebarResponse>)> {
        let jar = self.cookies.issue(jar, &session)?;
        Ok((
            jar,
            Json(SidebarResponse {
                left_sidebar_open: session.left_sidebar_open,
                right_sidebar_open: session.right_sidebar_open,
            }),
        ))
    }
}
