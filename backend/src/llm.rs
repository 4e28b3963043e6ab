//! Thin client for an OpenAI-compatible chat-completions endpoint.
//!
//! One blocking round trip per call, no retries: a transport failure, a
//! non-2xx status, or a response with no choices all surface as
//! `ApiError::Generation`, which the generation endpoints translate into a
//! failed (and unpersisted) generation.

use actix_web::web;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::Config;
use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

pub struct LlmClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(cfg: &web::Data<Config>) -> Self {
        LlmClient {
            client: Client::new(),
            base_url: cfg.openai_base_url.clone(),
            api_key: cfg.openai_api_key.clone(),
            model: cfg.openai_model.clone(),
        }
    }

    /// Free-form completion; returns the assistant message text.
    pub async fn chat(&self, system: &str, user: &str) -> Result<String, ApiError> {
        self.complete(system, user, None).await
    }

    /// Completion constrained to a JSON object response. The caller still
    /// validates the shape by parsing into a typed payload.
    pub async fn chat_json(&self, system: &str, user: &str) -> Result<String, ApiError> {
        self.complete(system, user, Some(json!({ "type": "json_object" })))
            .await
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
        response_format: Option<serde_json::Value>,
    ) -> Result<String, ApiError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            response_format,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::Generation(format!("Model request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Generation(format!(
                "Model request failed: {} - {}",
                status, body
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Generation(format!("Malformed model response: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ApiError::Generation("Model returned no choices".to_string()))
    }
}
