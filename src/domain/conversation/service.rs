use super::{fragment::message_fragment, ConversationContext};
use crate::{
    domain::{
        chat::{title_from_message, Chat, MessageRole},
        dispatch::{DispatchRequest, ModelDispatcher, ModelSpec, DEFAULT_MODEL_KEY},
        quota::{self, QuotaDecision},
        render::MarkdownRenderer,
        stream::ResponseCorrelator,
        user::{AccountTier, User},
    },
    error::{AppError, AppResult},
    infrastructure::repositories::{ChatRepository, MessageRepository, StreamRepository, UserRepository},
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

const MAX_COUNTER_ATTEMPTS: usize = 3;

/// Form body for POST /chat/messages
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub message: String,
    pub model: Option<String>,
    pub chat_id: Option<Uuid>,
}

#[derive(Debug)]
pub struct SendMessageOutcome {
    pub chat_id: Uuid,
    pub response_id: String,
    pub fragment: String,
}

pub fn new_response_id() -> String {
    format!("ai-response-{}", Uuid::new_v4().simple())
}

/// Accepts user messages and hands the reply off to a background worker
pub struct ConversationService {
    user_repo: Arc<UserRepository>,
    chat_repo: Arc<ChatRepository>,
    message_repo: Arc<MessageRepository>,
    stream_repo: Arc<StreamRepository>,
    worker: ReplyWorker,
}

impl ConversationService {
    pub fn new(
        user_repo: Arc<UserRepository>,
        chat_repo: Arc<ChatRepository>,
        message_repo: Arc<MessageRepository>,
        stream_repo: Arc<StreamRepository>,
        dispatcher: Arc<ModelDispatcher>,
        correlator: Arc<ResponseCorrelator>,
        renderer: Arc<MarkdownRenderer>,
    ) -> Self {
        let worker = ReplyWorker {
            dispatcher,
            message_repo: message_repo.clone(),
            correlator,
            renderer,
        };

        Self {
            user_repo,
            chat_repo,
            message_repo,
            stream_repo,
            worker,
        }
    }

    /// Gate, charge, persist, spawn the reply and return the placeholder fragment.
    /// `active_chat_id` is the chat the session currently points at.
    pub async fn send_message(
        &self,
        user_id: Uuid,
        active_chat_id: Option<Uuid>,
        request: SendMessageRequest,
    ) -> AppResult<SendMessageOutcome> {
        let text = request.message.trim();
        if text.is_empty() {
            return Err(AppError::Validation("Message cannot be empty.".to_string()));
        }

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

        let tier = user.effective_tier_at(Utc::now());
        let model_key = request
            .model
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .unwrap_or(DEFAULT_MODEL_KEY)
            .to_string();

        let spec = self.worker.dispatcher.authorize(&model_key, tier)?;
        self.charge(user, tier, &spec).await?;

        let chat = self
            .upsert_chat(user_id, request.chat_id.or(active_chat_id), text)
            .await?;

        let prior = self.message_repo.find_by_chat(chat.id).await?;
        let context = ConversationContext::from_messages(chat.id, &prior);
        self.message_repo
            .create_text(chat.id, MessageRole::User, text)
            .await?;

        let response_id = new_response_id();
        self.stream_repo.create(&response_id, chat.id).await?;

        tracing::info!(
            user_id = %user_id,
            chat_id = %chat.id,
            response_id = %response_id,
            model_key = %model_key,
            tier = %tier,
            cost = spec.cost,
            "Message accepted, starting reply"
        );

        self.worker
            .spawn(ReplyJob {
                response_id: response_id.clone(),
                message: text.to_string(),
                model_key: model_key.clone(),
                tier,
                context,
            })
            .await;

        Ok(SendMessageOutcome {
            chat_id: chat.id,
            fragment: message_fragment(text, &response_id, &model_key),
            response_id,
        })
    }

    /// Charge the model's cost against the monthly budget with optimistic retries
    async fn charge(&self, mut user: User, tier: AccountTier, spec: &ModelSpec) -> AppResult<()> {
        let limit = tier.monthly_request_limit();

        for _ in 0..MAX_COUNTER_ATTEMPTS {
            let now = Utc::now();
            match quota::evaluate(user.request_count, user.request_count_reset_at, now, spec.cost, limit) {
                QuotaDecision::Rejected { remaining, cost } => {
                    tracing::warn!(user_id = %user.id, remaining, cost, "Request quota exceeded");
                    return Err(AppError::QuotaExceeded {
                        message: format!(
                            "Not enough requests remaining. This model costs {} request(s) and you have {} left. Upgrade your plan for more.",
                            cost, remaining
                        ),
                        remaining,
                    });
                }
                QuotaDecision::Allowed { count, reset_at, rolled_over } => {
                    let stored = self
                        .user_repo
                        .compare_and_set_request_counter(
                            user.id,
                            user.request_count,
                            user.request_count_reset_at,
                            count,
                            reset_at,
                        )
                        .await?;
                    if stored {
                        if rolled_over {
                            tracing::info!(user_id = %user.id, "Monthly request counter rolled over");
                        }
                        return Ok(());
                    }
                }
            }

            // Counter moved underneath us, re-read and try again
            user = self
                .user_repo
                .find_by_id(user.id)
                .await?
                .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;
        }

        Err(AppError::Conflict(
            "Too many concurrent requests, please try again".to_string(),
        ))
    }

    /// Refresh the active chat's title, or start a new chat when there is none
    async fn upsert_chat(&self, user_id: Uuid, chat_id: Option<Uuid>, text: &str) -> AppResult<Chat> {
        let title = title_from_message(text);

        if let Some(chat_id) = chat_id {
            if let Some(chat) = self.chat_repo.update_title(chat_id, user_id, &title).await? {
                return Ok(chat);
            }
            tracing::debug!(chat_id = %chat_id, "Active chat not found, starting a new one");
        }

        self.chat_repo.create(user_id, &title).await
    }
}

struct ReplyJob {
    response_id: String,
    message: String,
    model_key: String,
    tier: AccountTier,
    context: ConversationContext,
}

/// Produces one reply per job: dispatch, persist, render, publish
#[derive(Clone)]
struct ReplyWorker {
    dispatcher: Arc<ModelDispatcher>,
    message_repo: Arc<MessageRepository>,
    correlator: Arc<ResponseCorrelator>,
    renderer: Arc<MarkdownRenderer>,
}

impl ReplyWorker {
    async fn spawn(&self, job: ReplyJob) {
        let response_id = job.response_id.clone();
        let worker = self.clone();
        let handle = tokio::spawn(async move { worker.run(job).await });
        self.correlator
            .attach_task(&response_id, handle.abort_handle())
            .await;
    }

    async fn run(&self, job: ReplyJob) {
        let reply = match self
            .dispatcher
            .dispatch(DispatchRequest {
                message: &job.message,
                model_key: &job.model_key,
                tier: job.tier,
                context: &job.context,
            })
            .await
        {
            Ok(reply) => reply,
            Err(e) => e.to_string(),
        };

        if let Err(e) = self
            .message_repo
            .create_text(job.context.chat_id, MessageRole::Assistant, &reply)
            .await
        {
            tracing::error!(
                response_id = %job.response_id,
                chat_id = %job.context.chat_id,
                error = %e,
                "Failed to persist assistant message"
            );
        }

        let html = self.renderer.render(&reply);
        match self.correlator.put(&job.response_id, html).await {
            Ok(()) => tracing::info!(
                response_id = %job.response_id,
                reply_length = reply.len(),
                "Reply ready for delivery"
            ),
            Err(e) => tracing::warn!(
                response_id = %job.response_id,
                error = %e,
                "Reply could not be published"
            ),
        }
    }
}
