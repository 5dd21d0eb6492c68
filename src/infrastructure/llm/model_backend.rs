use crate::domain::conversation::ConversationContext;
use async_trait::async_trait;

/// A backend that turns one user message into one complete reply.
/// Abstracts the provider (OpenAI-compatible gateway, internal agent service, ...).
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Complete `message` with the given provider model, continuing `context`.
    ///
    /// Streaming providers accumulate their deltas; the returned text is the full answer.
    async fn complete(
        &self,
        model: &str,
        message: &str,
        context: &ConversationContext,
    ) -> Result<String, String>;
}
