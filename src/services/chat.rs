use serde_json::Value;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Request/response wrapper over the Anthropic Messages API. Takes a prompt,
/// returns the completion text. Failures propagate unchanged to the caller.
pub struct ChatClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";

impl ChatClient {
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key: config.claude_api_key.clone(),
            model: config.claude_model.clone(),
        })
    }

    pub async fn complete(&self, prompt: &str) -> AppResult<String> {
        let response = self
            .http
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&serde_json::json!({
                "model": self.model,
                "max_tokens": 1024,
                "messages": [{
                    "role": "user",
                    "content": prompt
                }]
            }))
            .send()
            .await
            .map_err(|e| AppError::External(format!("Chat request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::External(format!(
                "Chat API error {}: {}",
                status, body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::External(format!("Chat response unreadable: {}", e)))?;

        extract_completion_text(&body)
            .ok_or_else(|| AppError::External("Chat response missing content text".into()))
    }
}

/// Pull the first content block's text out of a Messages API response.
fn extract_completion_text(body: &Value) -> Option<String> {
    body["content"][0]["text"].as_str().map(String::from)
}
