// Email drafting
//
// The model writes the narrative fields (subject line, analysis paragraph,
// value proposition, pitch); the template provides the structure. Model or
// parse failures degrade to deterministic copy, but a template render
// failure is a hard error for that one lead.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

use super::templates::{TemplateKind, TemplateSet};
use super::EmailDraft;
use crate::analyzer::{Analysis, AnalyzedLead};
use crate::config::SenderProfile;
use crate::leads::Lead;
use crate::llm::{parse_llm_json, CompletionRequest, LlmClient};

const COPYWRITER_SYSTEM: &str = "You are a professional email copywriter specializing in \
outreach for service providers. Always answer with a single JSON object and no other text.";

const DRAFT_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, Default, Deserialize)]
struct Personalization {
    #[serde(default)]
    personalized_subject: String,
    #[serde(default)]
    personalized_analysis: String,
    #[serde(default)]
    personalized_value_proposition: String,
    #[serde(default)]
    personalized_pitch: String,
}

pub struct EmailGenerator {
    llm: Arc<dyn LlmClient>,
    service_type: String,
    sender: SenderProfile,
    templates: TemplateSet,
    forced_template: Option<TemplateKind>,
}

impl EmailGenerator {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        service_type: impl Into<String>,
        sender: SenderProfile,
        template_dir: Option<&Path>,
    ) -> Result<Self> {
        Ok(Self {
            llm,
            service_type: service_type.into(),
            sender,
            templates: TemplateSet::load(template_dir)?,
            forced_template: None,
        })
    }

    /// Always use the given template instead of selecting by analysis
    /// substance.
    pub fn with_template(mut self, kind: TemplateKind) -> Self {
        self.forced_template = Some(kind);
        self
    }

    /// Draft one email. Errors here mean the template could not render for
    /// this lead; the caller decides whether to skip or abort.
    pub async fn draft(&self, analyzed: &AnalyzedLead) -> Result<EmailDraft> {
        let lead = &analyzed.lead;
        let analysis = &analyzed.analysis;

        let personalization = self.personalization(lead, analysis).await;
        let kind = self
            .forced_template
            .unwrap_or_else(|| self.select_template(analysis));
        let vars = self.template_vars(lead, analysis, &personalization);

        let rendered = self
            .templates
            .get(kind)
            .render(&vars)
            .with_context(|| format!("Failed to render {} template", kind.name()))?;

        let (subject, body) =
            split_subject(&rendered, &personalization.personalized_subject);

        Ok(EmailDraft {
            lead_id: lead.id.clone(),
            to_name: string_var(&vars, "name"),
            to_business: string_var(&vars, "business_name"),
            subject,
            body,
        })
    }

    /// Personalized template only when the analysis gave us something to
    /// personalize on.
    fn select_template(&self, analysis: &Analysis) -> TemplateKind {
        if analysis.has_substance() {
            TemplateKind::Personalized
        } else {
            TemplateKind::Basic
        }
    }

    async fn personalization(&self, lead: &Lead, analysis: &Analysis) -> Personalization {
        let lead_data = serde_json::json!({
            "name": lead.name,
            "business_name": lead.business_name,
            "platform": lead.platform,
            "url": lead.url,
            "industry": analysis.industry,
            "current_state": analysis.current_state,
            "opportunities": analysis.opportunities,
            "pain_points": analysis.pain_points,
            "target_audience": analysis.target_audience,
        });

        let prompt = format!(
            "Based on the following lead data, create a personalized email subject line and \
             narrative paragraphs for a {service_type} outreach email.\n\n\
             Lead data:\n{lead_data}\n\n\
             Return a JSON object with these fields:\n\
             - personalized_subject: An attention-grabbing, personalized email subject line\n\
             - personalized_analysis: A paragraph analyzing their current {service_type} and \
               suggesting improvements\n\
             - personalized_value_proposition: A paragraph explaining the value of professional \
               {service_type} for their business\n\
             - personalized_pitch: A brief, compelling pitch paragraph tailored to their \
               specific needs",
            service_type = self.service_type,
            lead_data = lead_data,
        );

        let request = CompletionRequest::new(prompt)
            .with_system(COPYWRITER_SYSTEM)
            .with_temperature(DRAFT_TEMPERATURE);

        let mut personalization = match self.llm.complete(&request).await {
            Ok(reply) => match parse_llm_json::<Personalization>(&reply) {
                Some(parsed) => parsed,
                None => {
                    tracing::warn!(
                        lead_id = %lead.id,
                        "Personalization reply was not parseable JSON, using reply as analysis"
                    );
                    Personalization {
                        personalized_analysis: reply.trim().to_string(),
                        ..Default::default()
                    }
                }
            },
            Err(e) => {
                tracing::warn!(
                    lead_id = %lead.id,
                    error = %e,
                    "Personalization call failed, using deterministic copy"
                );
                Personalization::default()
            }
        };

        self.fill_personalization_defaults(&mut personalization, analysis);
        personalization
    }

    // Every narrative field must end up non-empty; the templates reference
    // them unconditionally.
    fn fill_personalization_defaults(&self, p: &mut Personalization, analysis: &Analysis) {
        let industry = fallback_industry(analysis);
        let service = humanize(&self.service_type);

        if p.personalized_subject.is_empty() {
            p.personalized_subject = format!("Improve your {} {}", industry, service);
        }
        if p.personalized_analysis.is_empty() {
            p.personalized_analysis = format!(
                "Looking at your current {}, there is clear room to stand out from other {} \
                 businesses with a more polished presence.",
                service, industry
            );
        }
        if p.personalized_value_proposition.is_empty() {
            p.personalized_value_proposition = format!(
                "Professional {} gives businesses like yours a consistent, credible presence \
                 that turns visitors into customers.",
                service
            );
        }
        if p.personalized_pitch.is_empty() {
            p.personalized_pitch = format!(
                "I work with {} businesses on exactly this, and I'd be glad to share a few \
                 specific ideas for yours.",
                industry
            );
        }
    }

    fn template_vars(
        &self,
        lead: &Lead,
        analysis: &Analysis,
        p: &Personalization,
    ) -> Map<String, Value> {
        let service = humanize(&self.service_type);
        let industry = fallback_industry(analysis);

        let name = if lead.name.is_empty() {
            "there".to_string()
        } else {
            lead.name.clone()
        };
        let business_name = if !analysis.business_name.is_empty() {
            analysis.business_name.clone()
        } else if !lead.business_name.is_empty() {
            lead.business_name.clone()
        } else {
            "your business".to_string()
        };
        let platform = if lead.platform.is_empty() || lead.platform == "web" {
            "website".to_string()
        } else {
            lead.platform.clone()
        };

        let benefits = if analysis.benefits.is_empty() {
            vec![
                format!("Improve your {} to attract more customers", service),
                format!("Save time and resources with professional {}", service),
                format!("Stand out from competitors with high-quality {}", service),
            ]
        } else {
            analysis.benefits.clone()
        };

        let primary_service = if analysis.recommendation.primary_service.is_empty() {
            format!("{} Services", title_case(&service))
        } else {
            analysis.recommendation.primary_service.clone()
        };

        let mut vars = Map::new();
        vars.insert("name".into(), Value::String(name));
        vars.insert("business_name".into(), Value::String(business_name));
        vars.insert("industry".into(), Value::String(industry));
        vars.insert("platform".into(), Value::String(platform));
        vars.insert("service_type".into(), Value::String(service));
        vars.insert("sender_name".into(), Value::String(self.sender.name.clone()));
        vars.insert(
            "sender_title".into(),
            Value::String(self.sender.title.clone()),
        );
        vars.insert(
            "sender_contact".into(),
            Value::String(self.sender.contact.clone()),
        );
        vars.insert(
            "current_state".into(),
            Value::String(analysis.current_state.clone()),
        );
        vars.insert(
            "opportunities".into(),
            Value::Array(
                analysis
                    .opportunities
                    .iter()
                    .map(|o| Value::String(o.clone()))
                    .collect(),
            ),
        );
        vars.insert(
            "benefits".into(),
            Value::Array(benefits.into_iter().map(Value::String).collect()),
        );
        vars.insert("primary_service".into(), Value::String(primary_service));
        vars.insert(
            "personalized_subject".into(),
            Value::String(p.personalized_subject.clone()),
        );
        vars.insert(
            "personalized_analysis".into(),
            Value::String(p.personalized_analysis.clone()),
        );
        vars.insert(
            "personalized_value_proposition".into(),
            Value::String(p.personalized_value_proposition.clone()),
        );
        vars.insert(
            "personalized_pitch".into(),
            Value::String(p.personalized_pitch.clone()),
        );
        vars
    }
}

/// Split the leading `Subject:` line off the rendered body. When the
/// template carries no subject line, fall back to the personalized subject.
fn split_subject(rendered: &str, fallback: &str) -> (String, String) {
    let trimmed = rendered.trim_start();
    if let Some(rest) = trimmed.strip_prefix("Subject:") {
        let mut lines = rest.splitn(2, '\n');
        let subject = lines.next().unwrap_or_default().trim().to_string();
        let body = lines.next().unwrap_or_default().trim().to_string();
        return (subject, body);
    }
    (fallback.to_string(), rendered.trim().to_string())
}

fn string_var(vars: &Map<String, Value>, key: &str) -> String {
    vars.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn fallback_industry(analysis: &Analysis) -> String {
    if analysis.industry.is_empty() {
        "your industry".to_string()
    } else {
        analysis.industry.clone()
    }
}

/// "web_development" → "web development"
fn humanize(service_type: &str) -> String {
    service_type.replace('_', " ")
}

/// "web development" → "Web Development"
fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedLlm(Result<String, String>);

    #[async_trait]
    impl LlmClient for FixedLlm {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
            match &self.0 {
                Ok(reply) => Ok(reply.clone()),
                Err(message) => anyhow::bail!("{}", message),
            }
        }
        fn name(&self) -> &str {
            "fixed"
        }
        fn default_model(&self) -> &str {
            "fixed-model"
        }
    }

    fn generator(reply: Result<String, String>) -> EmailGenerator {
        EmailGenerator::new(
            Arc::new(FixedLlm(reply)),
            "web_development",
            SenderProfile::default(),
            None,
        )
        .unwrap()
    }

    fn analyzed_lead(with_analysis: bool) -> AnalyzedLead {
        let mut lead = Lead::new("https://instagram.com/acme_dental");
        lead.id = "l-1".to_string();
        lead.name = "Acme Dental".to_string();
        lead.platform = "instagram".to_string();
        lead.handle = "acme_dental".to_string();

        let analysis = if with_analysis {
            Analysis {
                lead_id: "l-1".to_string(),
                business_name: "Acme Dental".to_string(),
                industry: "dentistry".to_string(),
                current_state: "Single outdated page".to_string(),
                opportunities: vec![
                    "Modern responsive site".to_string(),
                    "Online booking".to_string(),
                    "Patient testimonials".to_string(),
                ],
                pain_points: vec!["Losing mobile visitors".to_string()],
                benefits: vec!["More bookings".to_string()],
                ..Default::default()
            }
        } else {
            Analysis::empty_for_id("l-1")
        };

        AnalyzedLead {
            lead,
            analysis,
        }
    }

    const PERSONALIZATION_REPLY: &str = r#"{
        "personalized_subject": "A sharper web presence for Acme Dental",
        "personalized_analysis": "Your current site undersells the practice.",
        "personalized_value_proposition": "A modern site builds trust before the first visit.",
        "personalized_pitch": "I can show you three quick wins this week."
    }"#;

    #[tokio::test]
    async fn test_personalized_template_selected_with_substance() {
        let generator = generator(Ok(PERSONALIZATION_REPLY.to_string()));
        let draft = generator.draft(&analyzed_lead(true)).await.unwrap();

        assert_eq!(draft.lead_id, "l-1");
        assert_eq!(draft.subject, "A sharper web presence for Acme Dental");
        assert!(draft.body.contains("Your current site undersells the practice."));
        // One bullet per opportunity.
        let bullets = draft
            .body
            .lines()
            .filter(|l| l.starts_with("- "))
            .count();
        assert!(bullets >= 3);
    }

    #[tokio::test]
    async fn test_basic_template_selected_without_substance() {
        let generator = generator(Ok(PERSONALIZATION_REPLY.to_string()));
        let draft = generator.draft(&analyzed_lead(false)).await.unwrap();

        // The basic template synthesizes its subject from industry/service.
        assert!(draft.subject.contains("web development"));
        assert!(draft.body.contains("Hi Acme Dental,"));
        // Empty analysis → conditional section omitted.
        assert!(!draft.body.contains("opportunities to enhance"));
    }

    #[tokio::test]
    async fn test_model_failure_still_drafts() {
        let generator = generator(Err("model down".to_string()));
        let draft = generator.draft(&analyzed_lead(true)).await.unwrap();

        assert!(!draft.subject.is_empty());
        assert!(!draft.body.is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_reply_becomes_analysis_paragraph() {
        let generator = generator(Ok("Just some prose, no JSON.".to_string()));
        let draft = generator.draft(&analyzed_lead(true)).await.unwrap();

        assert!(draft.body.contains("Just some prose, no JSON."));
    }

    #[tokio::test]
    async fn test_forced_template_overrides_selection() {
        let generator =
            generator(Ok(PERSONALIZATION_REPLY.to_string())).with_template(TemplateKind::Basic);
        let draft = generator.draft(&analyzed_lead(true)).await.unwrap();

        // Basic template's static subject, not the personalized one.
        assert!(draft.subject.contains("Enhance Your"));
    }

    #[tokio::test]
    async fn test_rendering_is_deterministic_for_same_inputs() {
        let generator = generator(Ok(PERSONALIZATION_REPLY.to_string()));
        let first = generator.draft(&analyzed_lead(true)).await.unwrap();
        let second = generator.draft(&analyzed_lead(true)).await.unwrap();

        assert_eq!(first.subject, second.subject);
        assert_eq!(first.body, second.body);
    }

    #[test]
    fn test_split_subject() {
        let (subject, body) = split_subject("Subject: Hello\n\nBody text", "fallback");
        assert_eq!(subject, "Hello");
        assert_eq!(body, "Body text");

        let (subject, body) = split_subject("No subject line here", "fallback");
        assert_eq!(subject, "fallback");
        assert_eq!(body, "No subject line here");
    }

    #[test]
    fn test_humanize_and_title_case() {
        assert_eq!(humanize("web_development"), "web development");
        assert_eq!(title_case("web development"), "Web Development");
    }
}
