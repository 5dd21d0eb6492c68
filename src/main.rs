use luira_chat_backend::infrastructure::config::{Config, LogFormat};
use luira_chat_backend::infrastructure::db::{check_connection, create_pool, run_migrations};
use luira_chat_backend::infrastructure::http::start_http_server;
use luira_chat_backend::infrastructure::llm::{AgentServiceBackend, ModelBackend, OpenRouterBackend};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting Luira Chat Backend on {}:{}",
        config.host,
        config.port
    );

    // Create database connection pool
    let pool = create_pool(&config.database_url).await?;
    tracing::info!("Database connection pool created");

    // Verify database connection
    check_connection(&pool).await?;
    tracing::info!("Database connection verified");

    run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    if config.openrouter_api_key.is_empty() {
        tracing::warn!("OPENROUTER_API_KEY not set. Hosted model replies will fail inline");
    }
    if config.stripe_webhook_secret.is_empty() {
        tracing::warn!("STRIPE_WEBHOOK_SECRET not set. Every webhook will be rejected");
    }
    if config.stripe_api_key.is_none() {
        tracing::info!("STRIPE_API_KEY not set. Checkout plans fall back to session metadata");
    }

    // Model backends
    let hosted_backend: Arc<dyn ModelBackend> = Arc::new(OpenRouterBackend::new(
        &config.openrouter_base_url,
        &config.openrouter_api_key,
    ));
    let agent_backend: Arc<dyn ModelBackend> =
        Arc::new(AgentServiceBackend::new(config.agent_service_url.clone())?);
    tracing::info!(
        hosted_base_url = %config.openrouter_base_url,
        agent_service_url = %config.agent_service_url,
        "Model backends initialized"
    );

    let pool = Arc::new(pool);
    let config = Arc::new(config);

    // Start HTTP server with all routes
    start_http_server(pool, config, hosted_backend, agent_backend).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "luira_chat_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "luira_chat_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
