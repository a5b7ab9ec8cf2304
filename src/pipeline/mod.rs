// Pipeline driver
//
// Chains the stages with strict ordering: discovery produces leads,
// analysis produces analyzed leads, drafting consumes only analyzed leads.
// Each stage is sequential over its batch; per-lead failures degrade or
// skip without aborting the batch.

use crate::analyzer::{AnalyzedLead, LeadAnalyzer};
use crate::email::{EmailDraft, EmailGenerator};
use crate::leads::{preprocess, Lead};
use crate::search::{FinderChain, SearchQuery};

/// Parameters for the discovery stage.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub keywords: String,
    pub platform: Option<String>,
    pub location: Option<String>,
    pub contact_info: Option<String>,
    pub limit: usize,
}

impl SearchParams {
    pub fn to_query(&self) -> SearchQuery {
        let mut query = SearchQuery::new(self.keywords.clone(), self.limit);
        if let Some(platform) = &self.platform {
            query = query.with_platform(platform.clone());
        }
        if let Some(location) = &self.location {
            query = query.with_location(location.clone());
        }
        if let Some(contact_info) = &self.contact_info {
            query = query.with_contact_info(contact_info.clone());
        }
        query
    }
}

/// Discovery: search (with strategy fallback) and normalize. Returns at
/// most `limit` leads; an all-strategies failure returns an empty batch.
pub async fn search_stage(finder: &FinderChain, params: &SearchParams) -> Vec<Lead> {
    let query = params.to_query();
    let raw = finder.find(&query).await;

    let mut leads = preprocess(&raw);
    leads.truncate(params.limit);

    tracing::info!(
        raw = raw.len(),
        leads = leads.len(),
        "Discovery stage complete"
    );
    leads
}

/// Analysis: one lead at a time. Per-lead failures yield empty analyses,
/// so the output always has one entry per input lead.
pub async fn analyze_stage(analyzer: &LeadAnalyzer, leads: &[Lead]) -> Vec<AnalyzedLead> {
    let mut analyzed = Vec::with_capacity(leads.len());
    for (index, lead) in leads.iter().enumerate() {
        tracing::info!(
            lead = index + 1,
            total = leads.len(),
            url = %lead.url,
            "Analyzing lead"
        );
        analyzed.push(analyzer.analyze(lead).await);
    }
    analyzed
}

/// Drafting: one draft per analyzed lead. A template failure is fatal for
/// that lead only; the draft is skipped with a log entry.
pub async fn email_stage(generator: &EmailGenerator, analyzed: &[AnalyzedLead]) -> Vec<EmailDraft> {
    let mut drafts = Vec::with_capacity(analyzed.len());
    for (index, entry) in analyzed.iter().enumerate() {
        tracing::info!(
            lead = index + 1,
            total = analyzed.len(),
            lead_id = %entry.lead.id,
            "Drafting email"
        );
        match generator.draft(entry).await {
            Ok(draft) => drafts.push(draft),
            Err(e) => {
                tracing::warn!(
                    lead_id = %entry.lead.id,
                    error = %e,
                    "Draft failed for this lead, continuing with the batch"
                );
            }
        }
    }
    drafts
}
