// Prompt construction for lead analysis
//
// All prompts ask for a JSON object with named fields; replies are parsed
// with `llm::parse_llm_json`, which tolerates prose around the object.

pub const ANALYST_SYSTEM: &str = "You are a professional business analyst specializing in \
identifying opportunities for service providers. Always answer with a single JSON object and \
no other text.";

/// Analysis prompt for a fetched website or profile page.
pub fn page_analysis_prompt(url: &str, content: &str, service_type: &str) -> String {
    format!(
        "Analyze the following website content from {url} and identify:\n\
         1. Current state of their {service_type} (if visible)\n\
         2. Potential opportunities for improvement\n\
         3. Specific pain points or challenges they might be facing\n\
         4. How professional services could benefit this business\n\
         5. Specific needs they might have related to {service_type}\n\
         6. Any information about their industry, target market, or business goals\n\n\
         Website content:\n{content}\n\n\
         Return a JSON object with these fields:\n\
         - business_name: The name of the business if you can identify it\n\
         - industry: The industry or niche the business appears to be in\n\
         - current_state: Brief assessment of their current {service_type}\n\
         - opportunities: List of 3-5 specific opportunities for improvement\n\
         - pain_points: List of 3-5 potential pain points or challenges\n\
         - benefits: List of 3-5 benefits professional services could provide\n\
         - specific_needs: List of 3-5 specific needs they might have\n\
         - target_audience: Their apparent target audience or customer base"
    )
}

/// Analysis prompt when no page content is available: judge from the
/// platform and handle alone, using common patterns for that platform.
pub fn profile_pattern_prompt(platform: &str, handle: &str, service_type: &str) -> String {
    format!(
        "You are analyzing a {platform} business profile with the handle \"{handle}\" and no \
         page content available.\n\n\
         Based on common patterns seen on {platform}, produce a plausible analysis covering:\n\
         1. Potential opportunities for improved {service_type}\n\
         2. Common issues businesses face on {platform} related to {service_type}\n\
         3. How professional services could improve their presence\n\
         4. Specific content or strategies that perform well on {platform}\n\n\
         Return a JSON object with these fields:\n\
         - business_name: A best guess at the business name from the handle\n\
         - industry: The likely industry or niche\n\
         - current_state: Brief assessment of their likely current {service_type}\n\
         - opportunities: List of 3-5 specific opportunities for improvement\n\
         - pain_points: List of 3-5 common pain points on {platform}\n\
         - benefits: List of 3-5 ways professional services could help\n\
         - specific_needs: List of 3-5 specific needs they might have\n\
         - target_audience: Their likely target audience"
    )
}

/// Service recommendation prompt over the finished analysis.
pub fn recommendation_prompt(lead_summary: &str, service_type: &str) -> String {
    format!(
        "You are a professional {service_type} service provider. Based on the following lead \
         data, recommend the specific service that would benefit this potential client most.\n\n\
         Lead data:\n{lead_summary}\n\n\
         Return a JSON object with these fields:\n\
         - primary_service: The main service recommendation\n\
         - value_proposition: Why this service would be valuable to the client"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_prompt_names_every_field() {
        let prompt = page_analysis_prompt("https://acme.com", "Title: Acme", "web_development");
        for field in [
            "business_name",
            "industry",
            "current_state",
            "opportunities",
            "pain_points",
            "benefits",
            "specific_needs",
            "target_audience",
        ] {
            assert!(prompt.contains(field), "missing field {field}");
        }
        assert!(prompt.contains("https://acme.com"));
        assert!(prompt.contains("web_development"));
    }

    #[test]
    fn test_profile_prompt_uses_platform_and_handle() {
        let prompt = profile_pattern_prompt("instagram", "acme_dental", "marketing");
        assert!(prompt.contains("instagram"));
        assert!(prompt.contains("acme_dental"));
        assert!(prompt.contains("marketing"));
    }
}
