// Lead discovery
//
// A `SearchBackend` turns a query into raw candidates. The `FinderChain`
// composes backends in priority order and degrades across them: a failing
// or empty strategy is logged and the next one takes over. All strategies
// failing yields an empty set; discovery never aborts the pipeline.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;

mod directory;
mod query;
mod serpapi;
mod session;

pub use directory::StaticDirectory;
pub use query::SearchQuery;
pub use serpapi::SerpApiClient;
pub use session::SessionSearch;

use crate::config::{SearchConfig, SearchMethod};
use crate::leads::RawCandidate;

// Rotated across outbound requests so repeated searches do not present a
// single fingerprint.
pub(crate) const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
];

pub(crate) fn pick_user_agent() -> &'static str {
    use rand::seq::SliceRandom;
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Trait for search strategies.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run the query and return raw candidates.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawCandidate>>;

    /// Strategy name used in logs and as `RawCandidate::source`.
    fn name(&self) -> &str;
}

/// Priority-ordered strategy chain.
pub struct FinderChain {
    backends: Vec<Box<dyn SearchBackend>>,
}

impl FinderChain {
    pub fn new(backends: Vec<Box<dyn SearchBackend>>) -> Self {
        Self { backends }
    }

    /// Build the chain for the configured method. The chain always contains
    /// every strategy at or below the selected one, so a rate-limited or
    /// expired primary degrades instead of failing the run.
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let mut backends: Vec<Box<dyn SearchBackend>> = Vec::new();

        if config.method == SearchMethod::Session {
            let cookie = config.session_cookie.clone().unwrap_or_default();
            backends.push(Box::new(SessionSearch::new(cookie)?));
        }

        if matches!(config.method, SearchMethod::Session | SearchMethod::SerpApi) {
            if let Some(key) = config.serpapi_api_key.clone().filter(|k| !k.is_empty()) {
                backends.push(Box::new(SerpApiClient::new(key)?));
            }
        }

        backends.push(Box::new(StaticDirectory));

        Ok(Self { backends })
    }

    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Gather candidates across strategies, deduplicated by URL.
    ///
    /// Overfetches to twice the requested limit so the preprocessor has
    /// room to drop contactless and duplicate records.
    pub async fn find(&self, query: &SearchQuery) -> Vec<RawCandidate> {
        let want = query.limit.saturating_mul(2).max(1);

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for backend in &self.backends {
            if candidates.len() >= want {
                break;
            }

            match backend.search(query).await {
                Ok(results) => {
                    tracing::info!(
                        backend = backend.name(),
                        count = results.len(),
                        "Search strategy returned candidates"
                    );
                    for candidate in results {
                        if seen.insert(candidate.url.clone()) {
                            candidates.push(candidate);
                            if candidates.len() >= want {
                                break;
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        backend = backend.name(),
                        error = %e,
                        "Search strategy failed, falling through to the next one"
                    );
                }
            }
        }

        candidates
    }
}
