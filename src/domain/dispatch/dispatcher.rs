use super::{
    catalog::{self, BackendKind, ModelSpec},
    error::DispatchError,
};
use crate::{
    domain::{conversation::ConversationContext, user::AccountTier},
    infrastructure::llm::ModelBackend,
};
use std::sync::Arc;

/// Reply delivered in place of the model's answer when the backend call fails
pub const BACKEND_FAILURE_REPLY: &str =
    "Sorry, I couldn't reach the model right now. Please try again in a moment.";

pub struct DispatchRequest<'a> {
    pub message: &'a str,
    pub model_key: &'a str,
    pub tier: AccountTier,
    pub context: &'a ConversationContext,
}

/// Routes a message to the backend serving the requested model
pub struct ModelDispatcher {
    hosted: Arc<dyn ModelBackend>,
    agent: Arc<dyn ModelBackend>,
}

impl ModelDispatcher {
    pub fn new(hosted: Arc<dyn ModelBackend>, agent: Arc<dyn ModelBackend>) -> Self {
        Self { hosted, agent }
    }

    /// Resolve the model and check the caller's tier against it
    pub fn authorize(&self, model_key: &str, tier: AccountTier) -> Result<ModelSpec, DispatchError> {
        let spec = catalog::resolve(model_key);
        if tier.rank() < spec.tier.rank() {
            return Err(DispatchError::Forbidden(catalog::upgrade_message(
                model_key, spec.tier,
            )));
        }
        Ok(spec)
    }

    /// Call the backend and return its full text. Backend failures become an inline reply.
    pub async fn dispatch(&self, request: DispatchRequest<'_>) -> Result<String, DispatchError> {
        let spec = self.authorize(request.model_key, request.tier)?;

        let (backend, model) = match spec.backend {
            BackendKind::Hosted(alias) => (&self.hosted, alias),
            BackendKind::Agent => (&self.agent, spec.key),
        };

        match backend
            .complete(model, request.message, request.context)
            .await
        {
            Ok(reply) => Ok(reply),
            Err(e) => {
                tracing::error!(
                    model_key = request.model_key,
                    chat_id = %request.context.chat_id,
                    error = %e,
                    "Model backend failed, delivering inline error"
                );
                Ok(BACKEND_FAILURE_REPLY.to_string())
            }
        }
    }
}
