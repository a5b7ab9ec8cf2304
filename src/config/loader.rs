// Configuration loader
// Reads ~/.prospector/config.toml when present, then applies environment
// variable overrides. Environment always wins.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use super::settings::{Config, SearchMethod};

/// Load configuration from the config file and environment.
pub fn load_config() -> Result<Config> {
    let mut config = try_load_from_file()?.unwrap_or_default();

    apply_env_overrides(&mut config)?;

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

fn try_load_from_file() -> Result<Option<Config>> {
    let Some(home) = dirs::home_dir() else {
        return Ok(None);
    };
    let config_path = home.join(".prospector/config.toml");

    if !config_path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file {}", config_path.display()))?;

    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;

    Ok(Some(config))
}

fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(value) = env_non_empty("SERVICE_TYPE") {
        config.service_type = value;
    }

    if let Some(value) = env_non_empty("SEARCH_METHOD") {
        config.search.method = value
            .parse::<SearchMethod>()
            .context("Invalid SEARCH_METHOD environment variable")?;
    }
    if let Some(value) = env_non_empty("SERPAPI_API_KEY") {
        config.search.serpapi_api_key = Some(value);
    }
    if let Some(value) = env_non_empty("SEARCH_SESSION_COOKIE") {
        config.search.session_cookie = Some(value);
    }

    if let Some(value) = env_non_empty("USE_LOCAL_LLM") {
        config.llm.use_local = matches!(value.to_lowercase().as_str(), "true" | "1" | "yes");
    }
    if let Some(value) = env_non_empty("OPENAI_API_KEY") {
        config.llm.api_key = Some(value);
    }
    if let Some(value) = env_non_empty("LLM_BASE_URL") {
        config.llm.base_url = value;
    }
    if let Some(value) = env_non_empty("LLM_MODEL") {
        config.llm.model = Some(value);
    }

    if let Some(value) = env_non_empty("SENDER_NAME") {
        config.sender.name = value;
    }
    if let Some(value) = env_non_empty("SENDER_TITLE") {
        config.sender.title = value;
    }
    if let Some(value) = env_non_empty("SENDER_CONTACT") {
        config.sender.contact = value;
    }

    if let Some(value) = env_non_empty("TEMPLATE_DIR") {
        config.template_dir = Some(PathBuf::from(value));
    }

    Ok(())
}

fn env_non_empty(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}
