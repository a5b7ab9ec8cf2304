// OpenAI-compatible chat completion client
//
// Covers the OpenAI cloud API as well as local endpoints that speak the
// same format (LM Studio, Ollama); only the base URL, key, and default
// model differ.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::retry::with_retry;
use super::{CompletionRequest, LlmClient};

const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
    provider_name: String,
}

impl OpenAiClient {
    /// Create a client for the OpenAI cloud API.
    pub fn new_openai(api_key: String) -> Result<Self> {
        Self::new(
            api_key,
            "https://api.openai.com/v1".to_string(),
            "gpt-4o-mini".to_string(),
            "openai".to_string(),
        )
    }

    /// Create a client for an OpenAI-compatible local endpoint.
    ///
    /// LM Studio and Ollama both require a non-empty key but ignore its
    /// value. The `/v1` path segment is appended when missing, so both
    /// `http://localhost:1234` and `http://localhost:1234/v1` work.
    pub fn new_local(base_url: String) -> Result<Self> {
        let base = base_url.trim_end_matches('/');
        let base = if base.ends_with("/v1") {
            base.to_string()
        } else {
            format!("{}/v1", base)
        };

        Self::new(
            "local".to_string(),
            base,
            "local-model".to_string(),
            "local".to_string(),
        )
    }

    /// Set a custom default model for this client.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    fn new(
        api_key: String,
        base_url: String,
        default_model: String,
        provider_name: String,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url,
            default_model,
            provider_name,
        })
    }

    fn to_chat_request(&self, request: &CompletionRequest) -> ChatRequest {
        let model = if request.model.is_empty() {
            self.default_model.clone()
        } else {
            request.model.clone()
        };

        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        ChatRequest {
            model,
            messages,
            max_tokens: Some(request.max_tokens),
            temperature: request.temperature,
        }
    }

    async fn complete_once(&self, request: &CompletionRequest) -> Result<String> {
        let chat_request = self.to_chat_request(request);
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        tracing::debug!(model = %chat_request.model, "Sending completion request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&chat_request)
            .send()
            .await
            .with_context(|| format!("Failed to reach LLM endpoint {}", url))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "LLM request failed\n\nStatus: {}\nBody: {}",
                status,
                error_body
            );
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse LLM response")?;

        let text = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("LLM returned no choices in response")?;

        Ok(text)
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        with_retry(|| self.complete_once(request)).await
    }

    fn name(&self) -> &str {
        &self.provider_name
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}

// Chat completion wire types

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_client_creation() {
        let client = OpenAiClient::new_openai("test-key".to_string()).unwrap();
        assert_eq!(client.name(), "openai");
        assert_eq!(client.default_model(), "gpt-4o-mini");
    }

    #[test]
    fn test_local_client_normalizes_base_url() {
        let client = OpenAiClient::new_local("http://localhost:1234".to_string()).unwrap();
        assert_eq!(client.base_url, "http://localhost:1234/v1");

        let client = OpenAiClient::new_local("http://localhost:1234/v1/".to_string()).unwrap();
        assert_eq!(client.base_url, "http://localhost:1234/v1");
    }

    #[test]
    fn test_request_model_override() {
        let client = OpenAiClient::new_openai("key".to_string())
            .unwrap()
            .with_model("gpt-4o");
        let chat = client.to_chat_request(&CompletionRequest::new("hi"));
        assert_eq!(chat.model, "gpt-4o");

        let chat = client.to_chat_request(&CompletionRequest::new("hi").with_model("gpt-3.5-turbo"));
        assert_eq!(chat.model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_system_prompt_is_prepended() {
        let client = OpenAiClient::new_openai("key".to_string()).unwrap();
        let chat =
            client.to_chat_request(&CompletionRequest::new("analyze").with_system("You analyze."));
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[0].role, "system");
        assert_eq!(chat.messages[1].role, "user");
    }

    #[tokio::test]
    async fn test_complete_against_mock_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"choices":[{"message":{"role":"assistant","content":"mocked reply"}}]}"#,
            )
            .create_async()
            .await;

        let client = OpenAiClient::new_local(server.url()).unwrap();
        let reply = client
            .complete(&CompletionRequest::new("ping"))
            .await
            .unwrap();

        assert_eq!(reply, "mocked reply");
        mock.assert_async().await;
    }
}
