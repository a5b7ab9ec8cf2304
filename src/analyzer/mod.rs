// Lead analysis
//
// One model call per lead (two with the recommendation pass), strictly
// sequential to stay under provider rate limits. Any failure (fetch, model,
// parse) degrades to an empty analysis for that lead; the batch never
// aborts.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

mod fetch;
mod prompts;

pub use fetch::{PageText, ProfileFetcher};

use crate::leads::Lead;
use crate::llm::{parse_llm_json, CompletionRequest, LlmClient};

const PAGE_CONTENT_BUDGET: usize = 4000;
const ANALYSIS_TEMPERATURE: f32 = 0.2;

/// The model's judgment about a lead's current state and needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Analysis {
    pub lead_id: String,
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub current_state: String,
    #[serde(default)]
    pub opportunities: Vec<String>,
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub specific_needs: Vec<String>,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default)]
    pub primary_service: String,
    #[serde(default)]
    pub value_proposition: String,
}

impl Analysis {
    /// The degraded result for a lead whose analysis failed.
    pub fn empty_for(lead: &Lead) -> Self {
        Self::empty_for_id(&lead.id)
    }

    pub fn empty_for_id(lead_id: &str) -> Self {
        Self {
            lead_id: lead_id.to_string(),
            ..Default::default()
        }
    }

    /// Whether the analysis carries enough substance to personalize on.
    pub fn has_substance(&self) -> bool {
        !self.current_state.is_empty() || !self.opportunities.is_empty()
    }
}

/// A lead together with its completed analysis. Drafting only accepts this
/// type, which is what enforces the no-draft-without-analysis ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedLead {
    pub lead: Lead,
    pub analysis: Analysis,
}

// Wire shape of the model's analysis reply; everything defaults so a
// partially-filled object still parses.
#[derive(Debug, Default, Deserialize)]
struct LlmAnalysis {
    #[serde(default)]
    business_name: String,
    #[serde(default)]
    industry: String,
    #[serde(default)]
    current_state: String,
    #[serde(default)]
    opportunities: Vec<String>,
    #[serde(default)]
    pain_points: Vec<String>,
    #[serde(default)]
    benefits: Vec<String>,
    #[serde(default)]
    specific_needs: Vec<String>,
    #[serde(default)]
    target_audience: String,
}

pub struct LeadAnalyzer {
    llm: Arc<dyn LlmClient>,
    fetcher: ProfileFetcher,
    service_type: String,
    fetch_pages: bool,
}

impl LeadAnalyzer {
    pub fn new(llm: Arc<dyn LlmClient>, service_type: impl Into<String>) -> Result<Self> {
        Ok(Self {
            llm,
            fetcher: ProfileFetcher::new()?,
            service_type: service_type.into(),
            fetch_pages: true,
        })
    }

    /// Disable page fetching; analysis falls back to platform-pattern
    /// prompts built from the lead record alone.
    pub fn with_page_fetch(mut self, enabled: bool) -> Self {
        self.fetch_pages = enabled;
        self
    }

    /// Analyze one lead. Infallible by contract: errors degrade to an
    /// empty analysis.
    pub async fn analyze(&self, lead: &Lead) -> AnalyzedLead {
        let analysis = match self.try_analyze(lead).await {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::warn!(
                    lead_id = %lead.id,
                    url = %lead.url,
                    error = %e,
                    "Analysis failed, recording empty analysis"
                );
                Analysis::empty_for(lead)
            }
        };

        AnalyzedLead {
            lead: lead.clone(),
            analysis,
        }
    }

    async fn try_analyze(&self, lead: &Lead) -> Result<Analysis> {
        let prompt = self.analysis_prompt(lead).await;

        let request = CompletionRequest::new(prompt)
            .with_system(prompts::ANALYST_SYSTEM)
            .with_temperature(ANALYSIS_TEMPERATURE);

        let reply = self.llm.complete(&request).await?;

        let parsed: LlmAnalysis = match parse_llm_json(&reply) {
            Some(parsed) => parsed,
            None => {
                tracing::warn!(lead_id = %lead.id, "Analysis reply was not parseable JSON");
                LlmAnalysis::default()
            }
        };

        let mut analysis = Analysis {
            lead_id: lead.id.clone(),
            business_name: non_empty_or(parsed.business_name, &lead.business_name),
            industry: non_empty_or(parsed.industry, &lead.industry),
            current_state: parsed.current_state,
            opportunities: parsed.opportunities,
            pain_points: parsed.pain_points,
            benefits: parsed.benefits,
            specific_needs: parsed.specific_needs,
            target_audience: parsed.target_audience,
            recommendation: Recommendation::default(),
        };

        // Second pass: service recommendation over the analysis. Failure
        // here degrades quietly; the generator has its own defaults.
        if let Some(recommendation) = self.recommend(lead, &analysis).await {
            analysis.recommendation = recommendation;
        }

        Ok(analysis)
    }

    async fn analysis_prompt(&self, lead: &Lead) -> String {
        if self.fetch_pages {
            match self.fetcher.fetch_text(&lead.url).await {
                Ok(page) => {
                    return prompts::page_analysis_prompt(
                        &lead.url,
                        &page.to_prompt_block(PAGE_CONTENT_BUDGET),
                        &self.service_type,
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        url = %lead.url,
                        error = %e,
                        "Page fetch failed, analyzing from profile metadata"
                    );
                }
            }
        }

        let platform = if lead.platform.is_empty() {
            "web"
        } else {
            lead.platform.as_str()
        };
        let handle = if lead.handle.is_empty() {
            lead.name.as_str()
        } else {
            lead.handle.as_str()
        };
        prompts::profile_pattern_prompt(platform, handle, &self.service_type)
    }

    async fn recommend(&self, lead: &Lead, analysis: &Analysis) -> Option<Recommendation> {
        let summary = serde_json::json!({
            "name": lead.name,
            "industry": analysis.industry,
            "keywords": lead.keywords,
            "current_state": analysis.current_state,
            "opportunities": analysis.opportunities,
            "pain_points": analysis.pain_points,
        });

        let request = CompletionRequest::new(prompts::recommendation_prompt(
            &summary.to_string(),
            &self.service_type,
        ))
        .with_system(prompts::ANALYST_SYSTEM)
        .with_temperature(ANALYSIS_TEMPERATURE);

        match self.llm.complete(&request).await {
            Ok(reply) => parse_llm_json(&reply),
            Err(e) => {
                tracing::warn!(lead_id = %lead.id, error = %e, "Recommendation call failed");
                None
            }
        }
    }
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedLlm {
        replies: Vec<Result<String, String>>,
        calls: AtomicUsize,
    }

    impl ScriptedLlm {
        fn new(replies: Vec<Result<String, String>>) -> Self {
            Self {
                replies,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
            let idx = self.calls.fetch_add(1, Ordering::SeqCst);
            match self.replies.get(idx % self.replies.len()).cloned() {
                Some(Ok(reply)) => Ok(reply),
                Some(Err(message)) => anyhow::bail!("{}", message),
                None => anyhow::bail!("no scripted reply"),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn default_model(&self) -> &str {
            "scripted-model"
        }
    }

    fn test_lead() -> Lead {
        let mut lead = Lead::new("https://instagram.com/acme_dental");
        lead.id = "l-1".to_string();
        lead.name = "Acme Dental".to_string();
        lead.platform = "instagram".to_string();
        lead.handle = "acme_dental".to_string();
        lead.keywords = "dentist".to_string();
        lead
    }

    fn analyzer_with(replies: Vec<Result<String, String>>) -> LeadAnalyzer {
        LeadAnalyzer::new(Arc::new(ScriptedLlm::new(replies)), "web_development")
            .unwrap()
            .with_page_fetch(false)
    }

    #[tokio::test]
    async fn test_analysis_parses_model_judgment() {
        let analysis_reply = r#"{
            "business_name": "Acme Dental",
            "industry": "dentistry",
            "current_state": "Outdated single-page site",
            "opportunities": ["Refresh the site", "Add online booking"],
            "pain_points": ["No mobile support"],
            "benefits": ["More bookings"],
            "specific_needs": ["Responsive redesign"],
            "target_audience": "Families"
        }"#;
        let recommendation_reply =
            r#"{"primary_service": "Website Redesign", "value_proposition": "More patients."}"#;

        let analyzer = analyzer_with(vec![
            Ok(analysis_reply.to_string()),
            Ok(recommendation_reply.to_string()),
        ]);

        let analyzed = analyzer.analyze(&test_lead()).await;
        assert_eq!(analyzed.analysis.lead_id, "l-1");
        assert_eq!(analyzed.analysis.industry, "dentistry");
        assert_eq!(analyzed.analysis.opportunities.len(), 2);
        assert_eq!(
            analyzed.analysis.recommendation.primary_service,
            "Website Redesign"
        );
        assert!(analyzed.analysis.has_substance());
    }

    #[tokio::test]
    async fn test_model_failure_degrades_to_empty_analysis() {
        let analyzer = analyzer_with(vec![Err("model unavailable".to_string())]);

        let analyzed = analyzer.analyze(&test_lead()).await;
        assert_eq!(analyzed.analysis.lead_id, "l-1");
        assert!(analyzed.analysis.current_state.is_empty());
        assert!(analyzed.analysis.opportunities.is_empty());
        assert!(!analyzed.analysis.has_substance());
    }

    #[tokio::test]
    async fn test_unparseable_reply_keeps_lead_fallbacks() {
        let analyzer = analyzer_with(vec![Ok("I cannot produce JSON today.".to_string())]);

        let analyzed = analyzer.analyze(&test_lead()).await;
        // Lead-derived fallbacks survive a garbage reply.
        assert_eq!(analyzed.analysis.business_name, "");
        assert_eq!(analyzed.analysis.industry, "dentist");
        assert!(!analyzed.analysis.has_substance());
    }

    #[tokio::test]
    async fn test_recommendation_failure_is_quiet() {
        let analyzer = analyzer_with(vec![
            Ok(r#"{"current_state": "fine", "industry": "dentistry"}"#.to_string()),
            Err("recommendation backend down".to_string()),
        ]);

        let analyzed = analyzer.analyze(&test_lead()).await;
        assert_eq!(analyzed.analysis.current_state, "fine");
        assert!(analyzed.analysis.recommendation.primary_service.is_empty());
    }
}
