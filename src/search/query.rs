// Search query construction

use serde::{Deserialize, Serialize};

/// Parameters for one lead search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub keywords: String,
    /// Platform domain to restrict to (e.g. "instagram.com").
    pub platform: Option<String>,
    pub location: Option<String>,
    /// Contact-info operand appended to surface reachable results,
    /// e.g. `@gmail.com OR contact OR email`.
    pub contact_info: Option<String>,
    /// Maximum number of leads the caller wants back.
    pub limit: usize,
}

impl SearchQuery {
    pub fn new(keywords: impl Into<String>, limit: usize) -> Self {
        Self {
            keywords: keywords.into(),
            platform: None,
            location: None,
            contact_info: None,
            limit,
        }
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        let platform = platform.into();
        if !platform.is_empty() {
            self.platform = Some(platform);
        }
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        let location = location.into();
        if !location.is_empty() {
            self.location = Some(location);
        }
        self
    }

    pub fn with_contact_info(mut self, contact_info: impl Into<String>) -> Self {
        let contact_info = contact_info.into();
        if !contact_info.is_empty() {
            self.contact_info = Some(contact_info);
        }
        self
    }

    /// Build the engine query string: quoted keywords, a `site:` restriction
    /// for the platform, a quoted location, and the contact-info operand in
    /// a group.
    pub fn to_query_string(&self) -> String {
        let mut query = format!("\"{}\"", self.keywords);

        if let Some(platform) = &self.platform {
            query.push_str(&format!(" site:{}", platform));
        }
        if let Some(location) = &self.location {
            query.push_str(&format!(" \"{}\"", location));
        }
        if let Some(contact_info) = &self.contact_info {
            query.push_str(&format!(" ({})", contact_info));
        }

        query
    }
}
