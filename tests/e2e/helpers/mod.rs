use async_trait::async_trait;
use luira_chat_backend::{
    domain::{
        auth::{SessionData, SessionManager},
        conversation::ConversationContext,
    },
    infrastructure::{
        auth::SESSION_COOKIE,
        config::{Config, Environment, LogFormat},
        http::build_app,
        llm::ModelBackend,
    },
};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use sqlx::PgPool;
use std::sync::Arc;
use test_context::AsyncTestContext;
use testcontainers::{clients::Cli, Container};
use testcontainers_modules::postgres::Postgres;
use tokio::net::TcpListener;
use uuid::Uuid;

pub mod api_client;
pub mod fixtures;

use api_client::TestClient;
use db_pool::{DatabasePool, PooledDatabase};
use fixtures::TestFixtures;

pub const TEST_SESSION_SECRET: &str = "test-session-secret-for-testing-only";
pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";

// Docker client for test containers
static DOCKER: Lazy<Cli> = Lazy::new(Cli::default);

// Shared PostgreSQL container for all tests
static SHARED_CONTAINER: Lazy<SharedContainer> = Lazy::new(SharedContainer::new);

// Global database pool
static DB_POOL: Lazy<DatabasePool> = Lazy::new(|| DatabasePool::new(SHARED_CONTAINER.port));

/// Shared container that lives for the duration of all tests
struct SharedContainer {
    _container: Container<'static, Postgres>,
    port: u16,
}

impl SharedContainer {
    fn new() -> Self {
        let container = DOCKER.run(Postgres::default());
        let port = container.get_host_port_ipv4(5432);

        println!("🐳 Started shared PostgreSQL container on port {}", port);

        Self {
            _container: container,
            port,
        }
    }
}

/// One recorded model invocation
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub message: String,
    pub history_len: usize,
}

/// Model backend that answers with a canned reply and records every call
pub struct FakeModelBackend {
    reply: String,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeModelBackend {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ModelBackend for FakeModelBackend {
    async fn complete(
        &self,
        model: &str,
        message: &str,
        context: &ConversationContext,
    ) -> Result<String, String> {
        self.calls.lock().push(RecordedCall {
            model: model.to_string(),
            message: message.to_string(),
            history_len: context.history.len(),
        });
        Ok(self.reply.clone())
    }
}

pub struct TestContext {
    pub client: TestClient,
    #[allow(dead_code)]
    pub pool: PgPool,
    pub config: Config,
    pub fixtures: TestFixtures,
    pub hosted: Arc<FakeModelBackend>,
    pub agent: Arc<FakeModelBackend>,
    _db: PooledDatabase,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            // Get a database from the shared pool
            let pooled_db = DB_POOL
                .get_database()
                .await
                .expect("Failed to get database from pool");

            let config = test_config(pooled_db.database_url.clone());

            // Fake model backends
            let hosted = Arc::new(FakeModelBackend::replying("Hello **world**"));
            let agent = Arc::new(FakeModelBackend::replying("Capmap says hi"));

            let app = build_app(
                Arc::new(pooled_db.pool.clone()),
                Arc::new(config.clone()),
                hosted.clone(),
                agent.clone(),
            );

            // Start server
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind listener");
            let addr = listener.local_addr().expect("Failed to get local addr");
            let base_url = format!("http://{}", addr);

            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            // Wait for server to be ready
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

            // Create test client and fixtures
            let client = TestClient::new(&base_url);
            let fixtures = TestFixtures::new(pooled_db.pool.clone());

            Self {
                client,
                pool: pooled_db.pool.clone(),
                config,
                fixtures,
                hosted,
                agent,
                _db: pooled_db,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // Database cleanup happens automatically via Drop on PooledDatabase
        }
    }
}

fn test_config(database_url: String) -> Config {
    Config {
        database_url,
        host: "127.0.0.1".to_string(),
        port: 0, // Will be assigned by the OS
        session_secret: TEST_SESSION_SECRET.to_string(),
        session_ttl_secs: 3600,
        environment: Environment::Development,
        log_format: LogFormat::Pretty,
        public_base_url: "https://luira.test".to_string(),
        openrouter_api_key: String::new(),
        openrouter_base_url: "http://127.0.0.1:9/api/v1".to_string(),
        agent_service_url: "http://127.0.0.1:9/chat_capmap".to_string(),
        stripe_api_key: None,
        stripe_webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
        response_ttl_secs: 60,
        stream_max_wait_secs: 3,
        stream_char_delay_ms: 0, // No pacing in tests
        stream_chunk_chars: 4,
    }
}

/// Cookie header value carrying a signed session for the user
pub fn session_cookie(user_id: Uuid) -> String {
    session_cookie_for(&SessionData::new(user_id))
}

pub fn session_cookie_for(session: &SessionData) -> String {
    let manager = SessionManager::new(TEST_SESSION_SECRET.to_string(), 3600);
    let token = manager.issue(session).expect("Failed to sign session");
    format!("{}={}", SESSION_COOKIE, token)
}

/// Extract the session cookie pair from a Set-Cookie header value
pub fn cookie_pair(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}
