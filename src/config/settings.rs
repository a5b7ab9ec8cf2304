// Configuration structs

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Which search strategy leads the finder chain.
///
/// The chain always degrades downward from the selected method:
/// `session` falls back to `serpapi` (when a key is configured) and then to
/// the static directory; `serpapi` falls back to the directory; `directory`
/// stands alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMethod {
    /// HTTP search with a logged-in session cookie.
    Session,
    /// SerpAPI paid search.
    SerpApi,
    /// Static directory fallback (no network credentials needed).
    Directory,
}

impl FromStr for SearchMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "session" => Ok(SearchMethod::Session),
            "serpapi" => Ok(SearchMethod::SerpApi),
            "directory" => Ok(SearchMethod::Directory),
            other => bail!(
                "Unknown search method `{}` (expected session, serpapi, or directory)",
                other
            ),
        }
    }
}

/// Search backend credentials and strategy selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub method: SearchMethod,
    pub serpapi_api_key: Option<String>,
    pub session_cookie: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            method: SearchMethod::Directory,
            serpapi_api_key: None,
            session_cookie: None,
        }
    }
}

/// Language-model backend selection.
///
/// `use_local` switches between the OpenAI cloud API and any
/// OpenAI-compatible local endpoint (LM Studio, Ollama).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub use_local: bool,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            use_local: false,
            api_key: None,
            base_url: "http://localhost:1234/v1".to_string(),
            model: None,
        }
    }
}

/// Signature block rendered into every outgoing draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderProfile {
    pub name: String,
    pub title: String,
    pub contact: String,
}

impl Default for SenderProfile {
    fn default() -> Self {
        Self {
            name: "Your Name".to_string(),
            title: "Professional Service Provider".to_string(),
            contact: "you@example.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service being offered, steers prompts and template wording
    /// (e.g. "web_development", "marketing", "design").
    pub service_type: String,

    pub search: SearchConfig,

    pub llm: LlmConfig,

    pub sender: SenderProfile,

    /// Optional directory with template overrides (basic.txt, personalized.txt).
    pub template_dir: Option<PathBuf>,
}

impl Config {
    /// Check configuration consistency. A selected strategy without its
    /// credential is a startup-fatal error, not a runtime degrade.
    pub fn validate(&self) -> Result<()> {
        match self.search.method {
            SearchMethod::SerpApi => {
                if self
                    .search
                    .serpapi_api_key
                    .as_deref()
                    .map_or(true, str::is_empty)
                {
                    bail!(
                        "SEARCH_METHOD=serpapi requires SERPAPI_API_KEY to be set\n\n\
                         Either export SERPAPI_API_KEY or switch to SEARCH_METHOD=directory"
                    );
                }
            }
            SearchMethod::Session => {
                if self
                    .search
                    .session_cookie
                    .as_deref()
                    .map_or(true, str::is_empty)
                {
                    bail!(
                        "SEARCH_METHOD=session requires SEARCH_SESSION_COOKIE to be set\n\n\
                         Copy the cookie header from a logged-in browser session, or switch\n\
                         to SEARCH_METHOD=directory"
                    );
                }
            }
            SearchMethod::Directory => {}
        }

        if !self.llm.use_local && self.llm.api_key.as_deref().map_or(true, str::is_empty) {
            bail!(
                "No LLM credentials configured.\n\n\
                 Set OPENAI_API_KEY, or set USE_LOCAL_LLM=true to use an\n\
                 OpenAI-compatible local endpoint (LLM_BASE_URL, default\n\
                 http://localhost:1234/v1)"
            );
        }

        Ok(())
    }

    pub fn service_type(&self) -> &str {
        if self.service_type.is_empty() {
            "general"
        } else {
            &self.service_type
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_local_llm() -> Config {
        Config {
            llm: LlmConfig {
                use_local: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config_requires_llm_credentials() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_local_llm_needs_no_api_key() {
        let config = config_with_local_llm();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serpapi_method_without_key_is_fatal() {
        let mut config = config_with_local_llm();
        config.search.method = SearchMethod::SerpApi;
        assert!(config.validate().is_err());

        config.search.serpapi_api_key = Some("serp-key".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_session_method_without_cookie_is_fatal() {
        let mut config = config_with_local_llm();
        config.search.method = SearchMethod::Session;
        assert!(config.validate().is_err());

        config.search.session_cookie = Some("SID=abc".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_search_method_parsing() {
        assert_eq!(
            "serpapi".parse::<SearchMethod>().unwrap(),
            SearchMethod::SerpApi
        );
        assert_eq!(
            "Directory".parse::<SearchMethod>().unwrap(),
            SearchMethod::Directory
        );
        assert!("browser".parse::<SearchMethod>().is_err());
    }

    #[test]
    fn test_service_type_defaults_to_general() {
        let config = Config::default();
        assert_eq!(config.service_type(), "general");

        let config = Config {
            service_type: "web_development".to_string(),
            ..Default::default()
        };
        assert_eq!(config.service_type(), "web_development");
    }
}
