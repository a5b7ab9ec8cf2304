// Public page fetching and text extraction
//
// Pulls the lead's page and reduces it to the handful of text blocks the
// analysis prompt cares about: title, meta description, about/services/
// contact fragments, and a bounded sample of the main content.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::time::Duration;

use crate::search::pick_user_agent;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const SECTION_CHAR_CAP: usize = 500;
const BODY_SAMPLE_CHAR_CAP: usize = 2000;

static ABOUT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\babout(?:\s+us)?\b|\bmission\b|\bour story\b|\bteam\b").unwrap());
static SERVICES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bservices\b|\bproducts\b|\bwhat we do\b|\boffering\b").unwrap());
static CONTACT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bcontact\b|\bemail\b|\bphone\b|\bcall us\b").unwrap());

/// Extracted page text, ready for prompt assembly.
#[derive(Debug, Clone, Default)]
pub struct PageText {
    pub title: String,
    pub meta_description: String,
    pub about: String,
    pub services: String,
    pub contact: String,
    pub body_sample: String,
}

impl PageText {
    /// Assemble the prompt block, bounded to `budget` characters so a
    /// sprawling page cannot blow the model's context.
    pub fn to_prompt_block(&self, budget: usize) -> String {
        let block = format!(
            "Title: {}\n\nMeta Description: {}\n\nAbout: {}\n\nServices: {}\n\nContact: {}\n\nMain Content Sample: {}",
            self.title,
            self.meta_description,
            self.about,
            self.services,
            self.contact,
            self.body_sample,
        );
        truncate_chars(&block, budget).to_string()
    }
}

pub struct ProfileFetcher {
    client: reqwest::Client,
}

impl ProfileFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    /// Fetch a page and extract its text. A short jittered delay precedes
    /// every request so sequential batches stay polite.
    pub async fn fetch_text(&self, url: &str) -> Result<PageText> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            anyhow::bail!("Not a fetchable URL: {}", url);
        }

        let delay_ms = {
            use rand::Rng;
            rand::thread_rng().gen_range(250..750)
        };
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;

        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, pick_user_agent())
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Fetch of {} returned status {}", url, status);
        }

        let html = response
            .text()
            .await
            .with_context(|| format!("Failed to read body of {}", url))?;

        Ok(extract_page_text(&html))
    }
}

/// Reduce an HTML document to the text blocks used for analysis.
pub(crate) fn extract_page_text(html: &str) -> PageText {
    let document = Html::parse_document(html);

    let title_sel = Selector::parse("title").expect("static selector");
    let meta_sel = Selector::parse(r#"meta[name="description"]"#).expect("static selector");
    let main_sel = Selector::parse("main, article, section").expect("static selector");
    let body_sel = Selector::parse("body").expect("static selector");
    let fragment_sel = Selector::parse("p, li, h1, h2, h3, footer").expect("static selector");

    let title = document
        .select(&title_sel)
        .next()
        .map(|el| clean_text(&el.text().collect::<Vec<_>>().join(" ")))
        .unwrap_or_default();

    let meta_description = document
        .select(&meta_sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| clean_text(s))
        .unwrap_or_default();

    // Prefer semantic containers for the body sample; fall back to <body>.
    let mut main_text = String::new();
    for el in document.select(&main_sel) {
        main_text.push_str(&el.text().collect::<Vec<_>>().join(" "));
        main_text.push(' ');
    }
    if main_text.trim().is_empty() {
        if let Some(body) = document.select(&body_sel).next() {
            main_text = body.text().collect::<Vec<_>>().join(" ");
        }
    }
    let body_sample = truncate_chars(&clean_text(&main_text), BODY_SAMPLE_CHAR_CAP).to_string();

    let mut about = String::new();
    let mut services = String::new();
    let mut contact = String::new();

    for el in document.select(&fragment_sel) {
        let text = clean_text(&el.text().collect::<Vec<_>>().join(" "));
        if text.is_empty() {
            continue;
        }
        if about.len() < SECTION_CHAR_CAP && ABOUT_RE.is_match(&text) {
            append_fragment(&mut about, &text);
        }
        if services.len() < SECTION_CHAR_CAP && SERVICES_RE.is_match(&text) {
            append_fragment(&mut services, &text);
        }
        if contact.len() < SECTION_CHAR_CAP && CONTACT_RE.is_match(&text) {
            append_fragment(&mut contact, &text);
        }
    }

    PageText {
        title,
        meta_description,
        about: truncate_chars(&about, SECTION_CHAR_CAP).to_string(),
        services: truncate_chars(&services, SECTION_CHAR_CAP).to_string(),
        contact: truncate_chars(&contact, SECTION_CHAR_CAP).to_string(),
        body_sample,
    }
}

fn append_fragment(section: &mut String, text: &str) {
    if !section.is_empty() {
        section.push(' ');
    }
    section.push_str(text);
}

fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Character-boundary-safe truncation.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
