// LLM client factory
//
// Builds the configured client: OpenAI cloud, or an OpenAI-compatible
// local endpoint when `use_local` is set.

use anyhow::{Context, Result};

use super::openai::OpenAiClient;
use super::LlmClient;
use crate::config::LlmConfig;

/// Create the LLM client described by the configuration.
pub fn create_client(config: &LlmConfig) -> Result<Box<dyn LlmClient>> {
    let client = if config.use_local {
        let mut client = OpenAiClient::new_local(config.base_url.clone())?;
        if let Some(model) = &config.model {
            client = client.with_model(model.clone());
        }
        client
    } else {
        let api_key = config
            .api_key
            .clone()
            .context("OPENAI_API_KEY is required when USE_LOCAL_LLM is not set")?;
        let mut client = OpenAiClient::new_openai(api_key)?;
        if let Some(model) = &config.model {
            client = client.with_model(model.clone());
        }
        client
    };

    Ok(Box::new(client))
}
