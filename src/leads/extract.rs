// Contact-channel extraction
//
// Pattern matching over search-hit text: email addresses (including the
// obfuscated "name at domain dot com" and HTML-entity forms seen on
// scrape-hostile pages), phone numbers, and social handles.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap()
});

static OBFUSCATED_EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b[a-z0-9._%+-]+\s+(?:at)\s+[a-z0-9-]+(?:\s*(?:dot|\.)\s*[a-z0-9-]+)*\s+(?:dot)\s+(?:com|org|net|edu|gov|io)\b",
    )
    .unwrap()
});

static MAILTO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"mailto:([A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,})").unwrap()
});

static PHONE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // +1 (123) 456-7890 and international variants
        Regex::new(r"\+\d{1,3}[-. ]?\(?\d{3}\)?[-. ]?\d{3}[-. ]?\d{4}\b").unwrap(),
        // (123) 456-7890, 123-456-7890, 123.456.7890
        Regex::new(r"\b\(?\d{3}\)?[-. ]?\d{3}[-. ]?\d{4}\b").unwrap(),
    ]
});

static AT_HANDLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@[A-Za-z0-9_.]{1,30}\b").unwrap());

static URL_HANDLE_RES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"(?:twitter\.com|x\.com)/([A-Za-z0-9_]{1,15})\b").unwrap(),
            "twitter",
        ),
        (
            Regex::new(r"instagram\.com/([A-Za-z0-9_.]{1,30})\b").unwrap(),
            "instagram",
        ),
        (
            Regex::new(r"facebook\.com/([A-Za-z0-9.]{1,50})\b").unwrap(),
            "facebook",
        ),
        (
            Regex::new(r"linkedin\.com/(?:in|company)/([A-Za-z0-9_-]{1,50})\b").unwrap(),
            "linkedin",
        ),
        (
            Regex::new(r"youtube\.com/(?:user|channel)/([A-Za-z0-9_-]{1,50})\b").unwrap(),
            "youtube",
        ),
        (
            Regex::new(r"tiktok\.com/@([A-Za-z0-9_.]{1,24})\b").unwrap(),
            "tiktok",
        ),
    ]
});

// Handles that are placeholders rather than real accounts.
const HANDLE_FALSE_POSITIVES: &[&str] = &["@example", "@username", "@user", "@test", "@me"];

/// Extract email addresses from text, deduplicated in first-seen order.
pub fn extract_emails(text: &str) -> Vec<String> {
    // Normalize HTML-entity obfuscation before the standard pass.
    let normalized = text.replace("&#64;", "@");

    let mut emails = Vec::new();

    for m in EMAIL_RE.find_iter(&normalized) {
        push_unique(&mut emails, m.as_str().to_string());
    }

    for m in OBFUSCATED_EMAIL_RE.find_iter(&normalized) {
        let candidate = m
            .as_str()
            .to_lowercase()
            .replace(" at ", "@")
            .replace(" dot ", ".")
            .replace(' ', "");
        if EMAIL_RE.is_match(&candidate) {
            push_unique(&mut emails, candidate);
        }
    }

    for caps in MAILTO_RE.captures_iter(&normalized) {
        push_unique(&mut emails, caps[1].to_string());
    }

    emails
}

/// Extract phone numbers, normalized to digits (leading `+` preserved).
pub fn extract_phone_numbers(text: &str) -> Vec<String> {
    let mut numbers = Vec::new();

    for re in PHONE_RES.iter() {
        for m in re.find_iter(text) {
            let cleaned: String = m
                .as_str()
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '+')
                .collect();

            let valid = if cleaned.starts_with('+') {
                cleaned.len() >= 11
            } else {
                cleaned.len() == 10 || (cleaned.len() == 11 && cleaned.starts_with('1'))
            };

            // The patterns overlap: a number already captured with its
            // country code would otherwise reappear without it.
            let already_seen = numbers
                .iter()
                .any(|n: &String| n.ends_with(&cleaned) || cleaned.ends_with(n.as_str()));

            if valid && !already_seen {
                numbers.push(cleaned);
            }
        }
    }

    numbers
}

/// Extract social media handles (always `@`-prefixed), deduplicated and
/// filtered for obvious placeholders.
pub fn extract_social_handles(text: &str) -> Vec<String> {
    let mut handles = Vec::new();

    for m in AT_HANDLE_RE.find_iter(text) {
        push_handle(&mut handles, m.as_str().to_string());
    }

    for (re, _) in URL_HANDLE_RES.iter() {
        for caps in re.captures_iter(text) {
            push_handle(&mut handles, format!("@{}", &caps[1]));
        }
    }

    handles
}

/// Derive (platform, handle) from a profile URL, e.g.
/// `https://www.instagram.com/acme_dental` → `("instagram", "acme_dental")`.
pub fn platform_handle_from_url(url: &str) -> Option<(String, String)> {
    for (re, platform) in URL_HANDLE_RES.iter() {
        if let Some(caps) = re.captures(url) {
            let handle = caps[1].to_string();
            if is_reserved_path_segment(&handle) {
                continue;
            }
            return Some((platform.to_string(), handle));
        }
    }
    None
}

// Path segments that look like handles but are platform pages.
fn is_reserved_path_segment(segment: &str) -> bool {
    matches!(
        segment.to_lowercase().as_str(),
        "p" | "reel" | "explore" | "search" | "hashtag" | "share" | "stories" | "accounts"
            | "about" | "legal" | "help" | "home" | "login" | "intl"
    )
}

fn push_handle(handles: &mut Vec<String>, handle: String) {
    let lower = handle.to_lowercase();
    if handle.len() <= 3 {
        return;
    }
    if HANDLE_FALSE_POSITIVES
        .iter()
        .any(|fp| lower == *fp || lower.starts_with(&format!("{}.", fp)))
    {
        return;
    }
    push_unique(handles, handle);
}

fn push_unique(items: &mut Vec<String>, candidate: String) {
    if !items.iter().any(|existing| existing.eq_ignore_ascii_case(&candidate)) {
        items.push(candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_email_extraction() {
        let emails = extract_emails("Reach us at info@acmedental.com or call.");
        assert_eq!(emails, vec!["info@acmedental.com"]);
    }

    #[test]
    fn test_obfuscated_email_extraction() {
        let emails = extract_emails("write to office at acmedental dot com for details");
        assert_eq!(emails, vec!["office@acmedental.com"]);
    }

    #[test]
    fn test_html_entity_email_extraction() {
        let emails = extract_emails("contact&#64;example.org");
        assert_eq!(emails, vec!["contact@example.org"]);
    }

    #[test]
    fn test_mailto_email_extraction() {
        let emails = extract_emails(r#"<a href="mailto:sales@shop.io">email</a>"#);
        assert_eq!(emails, vec!["sales@shop.io"]);
    }

    #[test]
    fn test_emails_are_deduplicated() {
        let emails = extract_emails("a@b.com then A@B.COM again mailto:a@b.com");
        assert_eq!(emails.len(), 1);
    }

    #[test]
    fn test_phone_extraction_us_formats() {
        let phones = extract_phone_numbers("Call (612) 555-0143 or 612.555.0144 today");
        assert_eq!(phones, vec!["6125550143", "6125550144"]);
    }

    #[test]
    fn test_phone_extraction_international() {
        let phones = extract_phone_numbers("Tel: +1 (612) 555-0143");
        assert_eq!(phones, vec!["+16125550143"]);
    }

    #[test]
    fn test_too_short_numbers_are_dropped() {
        assert!(extract_phone_numbers("room 555-0143").is_empty());
    }

    #[test]
    fn test_handle_extraction_from_text_and_urls() {
        let handles = extract_social_handles(
            "Follow @acme_dental or visit https://www.instagram.com/acmedental",
        );
        assert_eq!(handles, vec!["@acme_dental", "@acmedental"]);
    }

    #[test]
    fn test_placeholder_handles_are_filtered() {
        assert!(extract_social_handles("use @username or @me or @ab").is_empty());
    }

    #[test]
    fn test_platform_handle_from_url() {
        assert_eq!(
            platform_handle_from_url("https://www.instagram.com/acme_dental"),
            Some(("instagram".to_string(), "acme_dental".to_string()))
        );
        assert_eq!(
            platform_handle_from_url("https://www.linkedin.com/in/jane-doe"),
            Some(("linkedin".to_string(), "jane-doe".to_string()))
        );
        assert_eq!(
            platform_handle_from_url("https://x.com/acmepro"),
            Some(("twitter".to_string(), "acmepro".to_string()))
        );
        assert_eq!(platform_handle_from_url("https://example.com/about"), None);
    }

    #[test]
    fn test_platform_pages_are_not_handles() {
        assert_eq!(
            platform_handle_from_url("https://www.instagram.com/explore/tags/dentist"),
            None
        );
    }
}
