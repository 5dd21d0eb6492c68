use super::model_backend::ModelBackend;
use crate::domain::conversation::ConversationContext;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Serialize)]
struct AgentRequest<'a> {
    message: &'a str,
    general_agent_check: bool,
}

#[derive(Debug, Deserialize)]
struct AgentResponse {
    reply: Option<String>,
}

/// Internal HTTP agent service answering `POST {message}` with `{reply}`
pub struct AgentServiceBackend {
    client: reqwest::Client,
    url: String,
}

impl AgentServiceBackend {
    pub fn new(url: String) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { client, url })
    }
}

/// The `reply` field when present, otherwise the raw body
fn extract_reply(body: &str) -> String {
    serde_json::from_str::<AgentResponse>(body)
        .ok()
        .and_then(|parsed| parsed.reply)
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl ModelBackend for AgentServiceBackend {
    async fn complete(
        &self,
        model: &str,
        message: &str,
        context: &ConversationContext,
    ) -> Result<String, String> {
        tracing::info!(
            model = model,
            chat_id = %context.chat_id,
            url = %self.url,
            "Calling agent service"
        );

        let response = self
            .client
            .post(&self.url)
            .json(&AgentRequest {
                message,
                general_agent_check: false,
            })
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Agent service request failed");
                format!("Agent service request failed: {}", e)
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("Failed to read agent service response: {}", e))?;

        if !status.is_success() {
            tracing::error!(status = %status, "Agent service returned an error");
            return Err(format!("Agent service returned {}", status));
        }

        Ok(extract_reply(&body))
    }
}
