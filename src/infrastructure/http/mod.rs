use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::{sync::Arc, time::Duration};
use tower_http::trace::TraceLayer;

use crate::{
    controllers::{
        auth::AuthController, billing::BillingController, chat::ChatController,
        feedback::FeedbackController, health, seo::SeoController, session::SessionController,
        stream::StreamController, vote::VoteController,
    },
    domain::{
        auth::{AuthService, SessionManager},
        billing::BillingService,
        chat::ChatService,
        conversation::ConversationService,
        dispatch::ModelDispatcher,
        feedback::FeedbackService,
        render::MarkdownRenderer,
        stream::{DeliveryChannel, ResponseCorrelator, Typewriter},
        user::UserService,
    },
    infrastructure::{
        auth::{request_id_middleware, session_middleware, SessionCookies},
        config::Config,
        db::DbPool,
        llm::ModelBackend,
        repositories::{
            ChatRepository, FeedbackRepository, MessageRepository, StreamRepository,
            UserRepository, VoteRepository,
        },
        stripe::StripeClient,
    },
};

/// Wire repositories, services and controllers into the application router
pub fn build_app(
    pool: Arc<DbPool>,
    config: Arc<Config>,
    hosted_backend: Arc<dyn ModelBackend>,
    agent_backend: Arc<dyn ModelBackend>,
) -> Router {
    // === DEPENDENCY INJECTION SETUP ===
    // 1. Repositories (inject db pool)
    let user_repo = Arc::new(UserRepository::new(pool.clone()));
    let chat_repo = Arc::new(ChatRepository::new(pool.clone()));
    let message_repo = Arc::new(MessageRepository::new(pool.clone()));
    let vote_repo = Arc::new(VoteRepository::new(pool.clone()));
    let stream_repo = Arc::new(StreamRepository::new(pool.clone()));
    let feedback_repo = Arc::new(FeedbackRepository::new(pool.clone()));

    // 2. Long-lived shared components
    let cookies = Arc::new(SessionCookies::new(
        SessionManager::new(config.session_secret.clone(), config.session_ttl_secs),
        config.secure_cookies(),
    ));
    let correlator = Arc::new(ResponseCorrelator::new(Duration::from_secs(
        config.response_ttl_secs,
    )));
    let delivery = Arc::new(DeliveryChannel::new(
        correlator.clone(),
        Typewriter::new(
            config.stream_chunk_chars,
            Duration::from_millis(config.stream_char_delay_ms),
        ),
        Duration::from_secs(config.stream_max_wait_secs),
    ));
    let dispatcher = Arc::new(ModelDispatcher::new(hosted_backend, agent_backend));
    let renderer = Arc::new(MarkdownRenderer::new());
    let stripe_client = config
        .stripe_api_key
        .as_ref()
        .map(|key| Arc::new(StripeClient::new(key.clone())));

    // 3. Services (inject repositories and clients)
    let auth_service = Arc::new(AuthService::new(user_repo.clone()));
    let user_service = Arc::new(UserService::new(user_repo.clone()));
    let chat_service = Arc::new(ChatService::new(
        chat_repo.clone(),
        message_repo.clone(),
        vote_repo,
    ));
    let conversation_service = Arc::new(ConversationService::new(
        user_repo.clone(),
        chat_repo,
        message_repo,
        stream_repo,
        dispatcher,
        correlator,
        renderer,
    ));
    let billing_service = Arc::new(BillingService::new(
        user_repo.clone(),
        stripe_client,
        config.stripe_webhook_secret.clone(),
    ));
    let feedback_service = Arc::new(FeedbackService::new(feedback_repo, user_repo.clone()));

    // 4. Controllers (inject services)
    let auth_controller = Arc::new(AuthController::new(auth_service, cookies.clone()));
    let session_controller = Arc::new(SessionController::new(cookies.clone()));
    let chat_controller = Arc::new(ChatController::new(
        chat_service.clone(),
        user_service,
        conversation_service,
        cookies.clone(),
    ));
    let vote_controller = Arc::new(VoteController::new(chat_service));
    let stream_controller = Arc::new(StreamController::new(delivery));
    let billing_controller = Arc::new(BillingController::new(billing_service));
    let feedback_controller = Arc::new(FeedbackController::new(feedback_service));
    let seo_controller = Arc::new(SeoController::new(config.public_base_url.clone()));

    // Auth routes (public - no session required)
    let auth_routes = Router::new()
        .route("/register", post(AuthController::register))
        .route("/login", post(AuthController::login))
        .route("/logout", get(AuthController::logout).post(AuthController::logout))
        .with_state(auth_controller);

    // Sidebar toggles (require session)
    let session_routes = Router::new()
        .route("/toggle-left-sidebar", post(SessionController::toggle_left_sidebar))
        .route("/close-left-sidebar", post(SessionController::close_left_sidebar))
        .route("/toggle-right-sidebar", post(SessionController::toggle_right_sidebar))
        .route("/close-right-sidebar", post(SessionController::close_right_sidebar))
        .with_state(session_controller)
        .layer(middleware::from_fn_with_state(
            (user_repo.clone(), cookies.clone()),
            session_middleware,
        ));

    // Chat routes (require session)
    let chat_routes = Router::new()
        .route("/chat", get(ChatController::index))
        .route("/chat/request_info", get(ChatController::request_info))
        .route("/chat/history", get(ChatController::history))
        .route("/chat/messages", post(ChatController::send_message))
        .route(
            "/chat/:id",
            get(ChatController::show).delete(ChatController::delete),
        )
        .route("/api/models", get(ChatController::models))
        .with_state(chat_controller)
        .layer(middleware::from_fn_with_state(
            (user_repo.clone(), cookies.clone()),
            session_middleware,
        ));

    // Reply streaming (require session)
    let stream_routes = Router::new()
        .route("/chat/stream/:id", get(StreamController::stream))
        .with_state(stream_controller)
        .layer(middleware::from_fn_with_state(
            (user_repo.clone(), cookies.clone()),
            session_middleware,
        ));

    // Vote routes (require session)
    let vote_routes = Router::new()
        .route("/api/vote", get(VoteController::list).patch(VoteController::vote))
        .with_state(vote_controller)
        .layer(middleware::from_fn_with_state(
            (user_repo.clone(), cookies.clone()),
            session_middleware,
        ));

    // Feedback (require session)
    let feedback_routes = Router::new()
        .route("/feedback", post(FeedbackController::submit))
        .with_state(feedback_controller)
        .layer(middleware::from_fn_with_state(
            (user_repo.clone(), cookies.clone()),
            session_middleware,
        ));

    // Stripe webhook (public - authenticated by signature)
    let billing_routes = Router::new()
        .route("/stripe/webhook", post(BillingController::webhook))
        .with_state(billing_controller);

    // SEO (public)
    let seo_routes = Router::new()
        .route("/robots.txt", get(SeoController::robots))
        .route("/sitemap.xml", get(SeoController::sitemap))
        .with_state(seo_controller);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(pool)
        .merge(auth_routes)
        .merge(session_routes)
        .merge(chat_routes)
        .merge(stream_routes)
        .merge(vote_routes)
        .merge(feedback_routes)
        .merge(billing_routes)
        .merge(seo_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    pool: Arc<DbPool>,
    config: Arc<Config>,
    hosted_backend: Arc<dyn ModelBackend>,
    agent_backend: Arc<dyn ModelBackend>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_app(pool, config.clone(), hosted_backend, agent_backend);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
