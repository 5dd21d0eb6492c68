pub mod agent_service_backend;
pub mod model_backend;
pub mod openrouter_backend;

pub use agent_service_backend::AgentServiceBackend;
pub use model_backend::ModelBackend;
pub use openrouter_backend::OpenRouterBackend;
