use super::model_backend::ModelBackend;
use crate::domain::{chat::MessageRole, conversation::ConversationContext};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;

/// Hosted models behind an OpenAI-compatible gateway (OpenRouter)
pub struct OpenRouterBackend {
    client: Arc<Client<OpenAIConfig>>,
}

impl OpenRouterBackend {
    pub fn new(api_base: &str, api_key: &str) -> Self {
        let config = OpenAIConfig::new()
            .with_api_base(api_base)
            .with_api_key(api_key);

        Self {
            client: Arc::new(Client::with_config(config)),
        }
    }

    fn build_messages(
        message: &str,
        context: &ConversationContext,
    ) -> Result<Vec<ChatCompletionRequestMessage>, String> {
        let mut messages = Vec::with_capacity(context.history.len() + 1);

        for turn in &context.history {
            let built: ChatCompletionRequestMessage = match turn.role {
                MessageRole::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.text.clone())
                    .build()
                    .map_err(|e| e.to_string())?
                    .into(),
                MessageRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.text.clone())
                    .build()
                    .map_err(|e| e.to_string())?
                    .into(),
            };
            messages.push(built);
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(message.to_string())
                .build()
                .map_err(|e| e.to_string())?
                .into(),
        );

        Ok(messages)
    }
}

#[async_trait]
impl ModelBackend for OpenRouterBackend {
    async fn complete(
        &self,
        model: &str,
        message: &str,
        context: &ConversationContext,
    ) -> Result<String, String> {
        tracing::info!(
            model = model,
            chat_id = %context.chat_id,
            history_len = context.history.len(),
            message_length = message.len(),
            "Calling hosted model"
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(Self::build_messages(message, context)?)
            .build()
            .map_err(|e| format!("Failed to build completion request: {}", e))?;

        let mut stream = self.client.chat().create_stream(request).await.map_err(|e| {
            tracing::error!(model = model, error = %e, "Hosted model request failed");
            format!("Hosted model request failed: {}", e)
        })?;

        let mut full_response = String::new();
        while let Some(result) = stream.next().await {
            let response = result.map_err(|e| {
                tracing::error!(model = model, error = %e, "Hosted model stream failed");
                format!("Hosted model stream failed: {}", e)
            })?;
            for choice in response.choices {
                if let Some(content) = choice.delta.content {
                    full_response.push_str(&content);
                }
            }
        }

        tracing::info!(
            model = model,
            response_length = full_response.len(),
            "Hosted model reply received"
        );

        Ok(full_response)
    }
}
