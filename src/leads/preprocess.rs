// Candidate normalization
//
// Pure function from raw search hits to validated, deduplicated leads.
// Records without any contact channel are dropped; duplicates collapse on
// normalized email, or on (platform, handle) when no email was found.

use std::collections::HashSet;

use super::extract::{
    extract_emails, extract_phone_numbers, extract_social_handles, platform_handle_from_url,
};
use super::types::{Lead, RawCandidate};

/// Normalize raw candidates into leads.
pub fn preprocess(raw: &[RawCandidate]) -> Vec<Lead> {
    let mut seen = HashSet::new();
    let mut leads = Vec::new();

    for candidate in raw {
        let lead = normalize(candidate);

        if !lead.has_contact_channel() {
            tracing::warn!(
                url = %candidate.url,
                "Dropping candidate without email or social handle"
            );
            continue;
        }

        if !seen.insert(lead.identity()) {
            tracing::debug!(url = %candidate.url, "Dropping duplicate candidate");
            continue;
        }

        leads.push(lead);
    }

    leads
}

fn normalize(candidate: &RawCandidate) -> Lead {
    let text = format!("{} {}", candidate.title, candidate.snippet);

    let emails = extract_emails(&text);
    let phones = extract_phone_numbers(&text);

    // Strip found emails before handle matching so an address's domain part
    // is not mistaken for an @-handle.
    let mut handle_text = text.clone();
    for email in &emails {
        handle_text = handle_text.replace(email.as_str(), " ");
    }

    let (platform, handle) = match platform_handle_from_url(&candidate.url) {
        Some((platform, handle)) => (platform, handle),
        None => {
            let platform = domain_label(&candidate.url);
            let handle = extract_social_handles(&handle_text)
                .into_iter()
                .next()
                .map(|h| h.trim_start_matches('@').to_string())
                .unwrap_or_default();
            (platform, handle)
        }
    };

    let name = display_name(&candidate.title);

    let mut lead = Lead::new(candidate.url.clone());
    lead.name = name.clone();
    lead.business_name = name;
    lead.platform = platform;
    lead.handle = handle;
    lead.email = emails.into_iter().next().map(|e| e.to_lowercase());
    lead.phone = phones.into_iter().next();
    lead.industry = candidate
        .keywords
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string();
    lead.keywords = candidate.keywords.clone();
    lead.source = candidate.source.clone();
    lead
}

/// First segment of a result title: "Acme Dental - Minneapolis | Instagram"
/// becomes "Acme Dental".
fn display_name(title: &str) -> String {
    let first = title
        .split(" - ")
        .next()
        .unwrap_or(title)
        .split(" | ")
        .next()
        .unwrap_or(title);
    first.trim().to_string()
}

/// Second-level domain label for platforms we have no handle pattern for:
/// "https://www.acmedental.com/about" → "acmedental".
fn domain_label(url: &str) -> String {
    let host = url
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .split('/')
        .next()
        .unwrap_or_default();
    let host = host.trim_start_matches("www.");
    host.split('.').next().unwrap_or_default().to_string()
}
