// SerpAPI search backend
//
// Paid JSON search API; the middle rung of the finder chain.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{SearchBackend, SearchQuery};
use crate::leads::RawCandidate;

const SERPAPI_BASE_URL: &str = "https://serpapi.com";
const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct SerpApiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

impl SerpApiClient {
    pub fn new(api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: SERPAPI_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SearchBackend for SerpApiClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawCandidate>> {
        let q = query.to_query_string();
        let num = query.limit.saturating_mul(2).clamp(1, 20).to_string();
        let url = format!("{}/search.json", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .query(&[
                ("engine", "google"),
                ("q", q.as_str()),
                ("num", num.as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await
            .context("Failed to send SerpAPI search request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("SerpAPI error {}: {}", status, body);
        }

        let serp_response: SerpApiResponse = response
            .json()
            .await
            .context("Failed to parse SerpAPI response")?;

        let candidates = serp_response
            .organic_results
            .into_iter()
            .filter(|r| !r.link.is_empty())
            .map(|r| RawCandidate {
                title: r.title,
                url: r.link,
                snippet: r.snippet,
                source: "serpapi".to_string(),
                keywords: query.keywords.clone(),
            })
            .collect();

        Ok(candidates)
    }

    fn name(&self) -> &str {
        "serpapi"
    }
}
