// Shared test helpers: a scripted LLM and lead fixtures.
#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;

use prospector::analyzer::{Analysis, AnalyzedLead};
use prospector::leads::Lead;
use prospector::llm::{CompletionRequest, LlmClient};

/// An LLM that answers by prompt shape: personalization prompts get
/// narrative JSON, recommendation prompts get a service pick, everything
/// else gets an analysis object. Prompts containing `fail_marker` error
/// instead, to simulate a provider outage for one specific lead.
pub struct MockLlm {
    pub fail_marker: Option<String>,
}

impl MockLlm {
    pub fn new() -> Self {
        Self { fail_marker: None }
    }

    pub fn failing_for(marker: impl Into<String>) -> Self {
        Self {
            fail_marker: Some(marker.into()),
        }
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        if let Some(marker) = &self.fail_marker {
            if request.prompt.contains(marker.as_str()) {
                anyhow::bail!("model unavailable for this lead");
            }
        }

        if request.prompt.contains("personalized_subject") {
            return Ok(r#"{
                "personalized_subject": "A sharper online presence for your practice",
                "personalized_analysis": "Your current presence undersells the work you do.",
                "personalized_value_proposition": "A focused site converts visitors into clients.",
                "personalized_pitch": "I can walk you through three quick wins this week."
            }"#
            .to_string());
        }

        if request.prompt.contains("primary_service") {
            return Ok(
                r#"{"primary_service": "Website Redesign", "value_proposition": "More clients."}"#
                    .to_string(),
            );
        }

        Ok(r#"{
            "business_name": "Acme Dental",
            "industry": "dentistry",
            "current_state": "A dated single-page site",
            "opportunities": ["Responsive redesign", "Online booking", "Patient testimonials"],
            "pain_points": ["Losing mobile visitors", "No way to book online"],
            "benefits": ["More bookings", "Better first impressions"],
            "specific_needs": ["Mobile-friendly layout"],
            "target_audience": "Local families"
        }"#
        .to_string())
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }
}

pub fn sample_lead(id: &str, handle: &str) -> Lead {
    let mut lead = Lead::new(format!("https://www.instagram.com/{}", handle));
    lead.id = id.to_string();
    lead.name = format!("Lead {}", handle);
    lead.platform = "instagram".to_string();
    lead.handle = handle.to_string();
    lead.keywords = "dentist".to_string();
    lead.source = "directory".to_string();
    lead
}

pub fn sample_analyzed_lead(id: &str, handle: &str) -> AnalyzedLead {
    let lead = sample_lead(id, handle);
    let analysis = Analysis {
        current_state: "A dated single-page site".to_string(),
        opportunities: vec!["Responsive redesign".to_string(), "Online booking".to_string()],
        industry: "dentistry".to_string(),
        ..Analysis::empty_for(&lead)
    };
    AnalyzedLead { lead, analysis }
}
