use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub session_secret: String,
    pub session_ttl_secs: i64,
    pub environment: Environment,
    pub log_format: LogFormat,
    pub public_base_url: String,
    // Hosted models (OpenAI-compatible gateway)
    pub openrouter_api_key: String,
    pub openrouter_base_url: String,
    // Internal agent service
    pub agent_service_url: String,
    // Stripe
    pub stripe_api_key: Option<String>,
    pub stripe_webhook_secret: String,
    // Response streaming
    pub response_ttl_secs: u64,
    pub stream_max_wait_secs: u64,
    pub stream_char_delay_ms: u64,
    pub stream_chunk_chars: usize,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            database_url: env::var("DATABASE_URL")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "4567".to_string())
                .parse()?,
            session_secret: env::var("SESSION_SECRET")?,
            session_ttl_secs: env::var("SESSION_TTL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "production" => Environment::Production,
                    _ => Environment::Development,
                })?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:4567".to_string()),
            openrouter_api_key: env::var("OPENROUTER_API_KEY").unwrap_or_default(),
            openrouter_base_url: env::var("OPENROUTER_BASE_URL")
                .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string()),
            agent_service_url: env::var("AGENT_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:5000/chat_capmap".to_string()),
            stripe_api_key: env::var("STRIPE_API_KEY").ok().filter(|k| !k.is_empty()),
            stripe_webhook_secret: env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_default(),
            response_ttl_secs: env::var("RESPONSE_TTL_SECS")
                .unwrap_or_else(|_| "600".to_string())
                .parse()?,
            stream_max_wait_secs: env::var("STREAM_MAX_WAIT_SECS")
                .unwrap_or_else(|_| "180".to_string())
                .parse()?,
            stream_char_delay_ms: env::var("STREAM_CHAR_DELAY_MS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()?,
            stream_chunk_chars: env::var("STREAM_CHUNK_CHARS")
                .unwrap_or_else(|_| "1".to_string())
                .parse()?,
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Session cookies are only marked `Secure` outside development
    pub fn secure_cookies(&self) -> bool {
        !self.is_development()
    }
}
