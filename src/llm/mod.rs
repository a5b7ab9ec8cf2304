// Language-model client abstraction
//
// The pipeline only ever needs "prompt in, text out". A single trait covers
// the OpenAI cloud API and OpenAI-compatible local endpoints (LM Studio,
// Ollama), selected by configuration.

use anyhow::Result;
use async_trait::async_trait;

mod factory;
mod json;
mod openai;
mod retry;

pub use factory::create_client;
pub use json::{extract_json_object, parse_llm_json};
pub use openai::OpenAiClient;
pub use retry::with_retry;

/// A single completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System prompt, sent as a `{"role":"system"}` message when present.
    pub system: Option<String>,

    /// User prompt.
    pub prompt: String,

    /// Model name; empty means the client's default.
    pub model: String,

    /// Maximum tokens to generate.
    pub max_tokens: u32,

    /// Sampling temperature.
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            model: String::new(),
            max_tokens: 1024,
            temperature: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Trait for language-model backends.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a completion request and return the reply text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Backend name (e.g. "openai", "local").
    fn name(&self) -> &str;

    /// Default model for this backend.
    fn default_model(&self) -> &str;
}
