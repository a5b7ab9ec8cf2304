// Cookie-session search backend
//
// Issues a plain HTTP request against the HTML search endpoint with a
// caller-supplied session cookie and parses result anchors out of the page.
// The top rung of the finder chain: auth expiry or blocking surfaces as an
// error and the chain degrades to the next strategy.

use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;

use super::{pick_user_agent, SearchBackend, SearchQuery};
use crate::leads::RawCandidate;

const DEFAULT_SEARCH_URL: &str = "https://www.google.com/search";
const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct SessionSearch {
    client: reqwest::Client,
    cookie: String,
    base_url: String,
}

impl SessionSearch {
    pub fn new(cookie: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            cookie,
            base_url: DEFAULT_SEARCH_URL.to_string(),
        })
    }

    /// Point the backend at a different endpoint (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SearchBackend for SessionSearch {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawCandidate>> {
        let q = query.to_query_string();
        let num = query.limit.saturating_mul(2).clamp(1, 20).to_string();

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", q.as_str()), ("num", num.as_str())])
            .header(reqwest::header::COOKIE, &self.cookie)
            .header(reqwest::header::USER_AGENT, pick_user_agent())
            .send()
            .await
            .context("Failed to send session search request")?;

        let status = response.status();
        if !status.is_success() {
            // 401/403/429 here typically means the session expired or the
            // engine is rate limiting; the chain handles the degrade.
            anyhow::bail!("Session search returned status {}", status);
        }

        let html = response
            .text()
            .await
            .context("Failed to read session search response body")?;

        Ok(parse_result_page(&html, &query.keywords))
    }

    fn name(&self) -> &str {
        "session"
    }
}

/// Pull result links out of a search page: anchors wrapping an `h3` title.
/// Redirect-style `/url?q=` hrefs are unwrapped; same-engine and non-http
/// links are skipped.
fn parse_result_page(html: &str, keywords: &str) -> Vec<RawCandidate> {
    let document = Html::parse_document(html);
    let anchor_sel = Selector::parse("a").expect("static selector");
    let title_sel = Selector::parse("h3").expect("static selector");

    let mut candidates = Vec::new();

    for anchor in document.select(&anchor_sel) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(title_el) = anchor.select(&title_sel).next() else {
            continue;
        };

        let Some(url) = clean_result_href(href) else {
            continue;
        };

        let title = title_el.text().collect::<Vec<_>>().join(" ");
        let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
        if title.is_empty() {
            continue;
        }

        candidates.push(RawCandidate {
            title,
            url,
            snippet: String::new(),
            source: "session".to_string(),
            keywords: keywords.to_string(),
        });
    }

    candidates
}

fn clean_result_href(href: &str) -> Option<String> {
    let href = href.strip_prefix("/url?q=").unwrap_or(href);
    let href = href.split('&').next().unwrap_or(href);

    if !href.starts_with("http://") && !href.starts_with("https://") {
        return None;
    }
    if href.contains("google.") {
        return None;
    }

    Some(href.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULT_PAGE: &str = r#"
        <html><body>
          <div class="g">
            <a href="/url?q=https://www.instagram.com/acme_dental&amp;sa=U">
              <h3>Acme Dental | Instagram</h3>
            </a>
          </div>
          <div class="g">
            <a href="https://www.brightsmiles.com/contact"><h3>Bright Smiles - Contact Us</h3></a>
          </div>
          <a href="https://accounts.google.com/signin"><h3>Sign in</h3></a>
          <a href="/settings"><h3>Settings</h3></a>
          <a href="https://www.notitle.com">no title anchor</a>
        </body></html>
    "#;

    #[test]
    fn test_parse_result_page_extracts_titled_anchors() {
        let results = parse_result_page(RESULT_PAGE, "dentist");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].url, "https://www.instagram.com/acme_dental");
        assert_eq!(results[0].title, "Acme Dental | Instagram");
        assert_eq!(results[1].url, "https://www.brightsmiles.com/contact");
        assert!(results.iter().all(|c| c.source == "session"));
    }

    #[test]
    fn test_redirect_hrefs_are_unwrapped() {
        assert_eq!(
            clean_result_href("/url?q=https://example.com/page&sa=U&ved=x"),
            Some("https://example.com/page".to_string())
        );
    }

    #[test]
    fn test_engine_and_relative_links_are_skipped() {
        assert_eq!(clean_result_href("https://www.google.com/maps"), None);
        assert_eq!(clean_result_href("/settings"), None);
    }

    #[tokio::test]
    async fn test_expired_session_surfaces_as_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Any)
            .with_status(403)
            .create_async()
            .await;

        let backend = SessionSearch::new("SID=stale".to_string())
            .unwrap()
            .with_base_url(format!("{}/search", server.url()));

        let result = backend.search(&SearchQuery::new("dentist", 5)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_search_parses_live_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Any)
            .with_status(200)
            .with_body(RESULT_PAGE)
            .create_async()
            .await;

        let backend = SessionSearch::new("SID=fresh".to_string())
            .unwrap()
            .with_base_url(format!("{}/search", server.url()));

        let results = backend.search(&SearchQuery::new("dentist", 5)).await.unwrap();
        assert_eq!(results.len(), 2);
    }
}
