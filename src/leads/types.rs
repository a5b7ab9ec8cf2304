// Lead entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A raw search hit, before normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCandidate {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub snippet: String,
    /// Backend that produced the hit ("serpapi", "session", "directory").
    pub source: String,
    /// Keywords the search was run with.
    #[serde(default)]
    pub keywords: String,
}

/// A prospective client with contact and identifying metadata.
///
/// Identity is the normalized email when present, otherwise the
/// (platform, handle) pair; see [`Lead::identity`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub handle: String,
    pub url: String,
    // Options serialize as null/empty rather than being skipped so the CSV
    // column set stays identical across rows.
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub source: String,
    #[serde(default = "Utc::now")]
    pub discovered_at: DateTime<Utc>,
}

impl Lead {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: String::new(),
            platform: String::new(),
            handle: String::new(),
            url: url.into(),
            email: None,
            phone: None,
            business_name: String::new(),
            industry: String::new(),
            keywords: String::new(),
            source: String::new(),
            discovered_at: Utc::now(),
        }
    }

    /// Deduplication key: normalized email, or (platform, handle).
    pub fn identity(&self) -> String {
        if let Some(email) = &self.email {
            let normalized = email.trim().to_lowercase();
            if !normalized.is_empty() {
                return normalized;
            }
        }
        format!(
            "{}:{}",
            self.platform.to_lowercase(),
            self.handle.to_lowercase()
        )
    }

    /// A lead without any way to reach it is useless downstream.
    pub fn has_contact_channel(&self) -> bool {
        self.email.as_deref().map_or(false, |e| !e.is_empty()) || !self.handle.is_empty()
    }
}
