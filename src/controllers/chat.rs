use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Extension, Form, Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        chat::{ChatDetailResponse, ChatGroups, ChatService, ChatServiceApi},
        conversation::{ConversationService, SendMessageRequest},
        dispatch::{options_for, ModelOption},
        user::{ProfileResponse, RequestInfo, UserService, UserServiceApi},
    },
    error::AppResult,
    infrastructure::auth::{AuthUser, SessionCookies},
};

#[derive(Debug, Serialize)]
pub struct ChatPageResponse {
    pub user: ProfileResponse,
    pub left_sidebar_open: bool,
    pub right_sidebar_open: bool,
    pub show_welcome: bool,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub tier: String,
    pub models: Vec<ModelOption>,
}

pub struct ChatController {
    chat_service: Arc<ChatService>,
    user_service: Arc<UserService>,
    conversation_service: Arc<ConversationService>,
    cookies: Arc<SessionCookies>,
}

impl ChatController {
    pub fn new(
        chat_service: Arc<ChatService>,
        user_service: Arc<UserService>,
        conversation_service: Arc<ConversationService>,
        cookies: Arc<SessionCookies>,
    ) -> Self {
        Self {
            chat_service,
            user_service,
            conversation_service,
            cookies,
        }
    }

    /// GET /chat - Start fresh: clears the active chat
    pub async fn index(
        State(controller): State<Arc<ChatController>>,
        Extension(auth_user): Extension<AuthUser>,
        jar: CookieJar,
    ) -> AppResult<(CookieJar, Json<ChatPageResponse>)> {
        let profile = controller.user_service.get_profile(auth_user.user_id).await?;
        let session = auth_user.session.with_chat(None);
        let jar = controller.cookies.issue(jar, &session)?;

        Ok((
            jar,
            Json(ChatPageResponse {
                user: profile,
                left_sidebar_open: session.left_sidebar_open,
                right_sidebar_open: session.right_sidebar_open,
                show_welcome: true,
            }),
        ))
    }

    /// GET /chat/request_info - Monthly request budget
    pub async fn request_info(
        State(controller): State<Arc<ChatController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> AppResult<Json<RequestInfo>> {
        let info = controller.user_service.get_request_info(auth_user.user_id).await?;
        Ok(Json(info))
    }

    /// GET /chat/history - Chats grouped by recency
    pub async fn history(
        State(controller): State<Arc<ChatController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> AppResult<Json<ChatGroups>> {
        let groups = controller.chat_service.history(auth_user.user_id).await?;
        Ok(Json(groups))
    }

    /// GET /chat/:id - Open a chat and make it the active one
    pub async fn show(
        State(controller): State<Arc<ChatController>>,
        Extension(auth_user): Extension<AuthUser>,
        Path(chat_id): Path<Uuid>,
        jar: CookieJar,
    ) -> AppResult<(CookieJar, Json<ChatDetailResponse>)> {
        let detail = controller.chat_service.show(auth_user.user_id, chat_id).await?;
        let jar = controller
            .cookies
            .issue(jar, &auth_user.session.with_chat(Some(chat_id)))?;

        Ok((jar, Json(detail)))
    }

    /// DELETE /chat/:id - Delete a chat and return the refreshed history
    pub async fn delete(
        State(controller): State<Arc<ChatController>>,
        Extension(auth_user): Extension<AuthUser>,
        Path(chat_id): Path<Uuid>,
        jar: CookieJar,
    ) -> AppResult<(CookieJar, Json<ChatGroups>)> {
        let groups = controller.chat_service.delete(auth_user.user_id, chat_id).await?;

        let jar = if auth_user.session.current_chat_id == Some(chat_id) {
            controller.cookies.issue(jar, &auth_user.session.with_chat(None))?
        } else {
            jar
        };

        Ok((jar, Json(groups)))
    }

    /// POST /chat/messages - Accept a message; the reply arrives over SSE
    pub async fn send_message(
        State(controller): State<Arc<ChatController>>,
        Extension(auth_user): Extension<AuthUser>,
        jar: CookieJar,
        Form(request): Form<SendMessageRequest>,
    ) -> AppResult<impl IntoResponse> {
        let active_chat_id = auth_user.session.current_chat_id;
        let outcome = controller
            .conversation_service
            .send_message(auth_user.user_id, active_chat_id, request)
            .await?;

        let jar = controller
            .cookies
            .issue(jar, &auth_user.session.with_chat(Some(outcome.chat_id)))?;

        Ok((
            jar,
            [
                (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
                (header::HeaderName::from_static("x-response-id"), outcome.response_id),
            ],
            outcome.fragment,
        ))
    }

    /// GET /api/models - Catalog with per-caller availability
    pub async fn models(
        State(controller): State<Arc<ChatController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> AppResult<Json<ModelsResponse>> {
        let tier = controller.user_service.get_effective_tier(auth_user.user_id).await?;
        Ok(Json(ModelsResponse {
            tier: tier.to_string(),
            models: options_for(tier),
        }))
    }
}
