use crate::{
    domain::auth::{SessionData, SessionManager},
    error::AppResult,
};
use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

pub const SESSION_COOKIE: &str = "luira.session";

/// Issues and reads the signed session cookie
#[derive(Clone)]
pub struct SessionCookies {
    manager: SessionManager,
    secure: bool,
}

impl SessionCookies {
    pub fn new(manager: SessionManager, secure: bool) -> Self {
        Self { manager, secure }
    }

    /// Decode the session from request headers, if present and valid
    pub fn read(&self, headers: &HeaderMap) -> AppResult<Option<SessionData>> {
        match CookieJar::from_headers(headers).get(SESSION_COOKIE) {
            Some(cookie) => self.manager.validate(cookie.value()).map(Some),
            None => Ok(None),
        }
    }

    /// Add a freshly signed session cookie to the jar
    pub fn issue(&self, jar: CookieJar, session: &SessionData) -> AppResult<CookieJar> {
        let token = self.manager.issue(session)?;
        let cookie = Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .build();

        Ok(jar.add(cookie))
    }

    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
    }
}
