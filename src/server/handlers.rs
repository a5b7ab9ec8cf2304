// HTTP handlers
//
// JSON bodies mirror the CLI flags; responses are the stage outputs.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::AppState;
use crate::analyzer::{AnalyzedLead, LeadAnalyzer};
use crate::email::{EmailDraft, EmailGenerator, TemplateKind, TemplateSet};
use crate::leads::Lead;
use crate::pipeline;

const MAX_SEARCH_LIMIT: usize = 20;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_info))
        .route("/health", get(health_check))
        .route("/search", post(search_leads))
        .route("/analyze", post(analyze_leads))
        .route("/email", post(generate_emails))
        .route("/templates", get(list_templates))
        .route("/service-types", get(service_types))
        .with_state(state)
}

/// Error response carrying a status and a JSON error body.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

#[derive(Debug, Serialize)]
struct RootInfo {
    service: &'static str,
    version: &'static str,
    service_type: String,
    llm_backend: String,
    search_backends: Vec<String>,
}

async fn root_info(State(state): State<Arc<AppState>>) -> Json<RootInfo> {
    Json(RootInfo {
        service: "prospector",
        version: env!("CARGO_PKG_VERSION"),
        service_type: state.config.service_type().to_string(),
        llm_backend: state.llm.name().to_string(),
        search_backends: state
            .finder
            .backend_names()
            .into_iter()
            .map(String::from)
            .collect(),
    })
}

async fn health_check() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    keywords: String,
    #[serde(default)]
    platform: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    contact_info: Option<String>,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    5
}

async fn search_leads(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Vec<Lead>>, ApiError> {
    if request.keywords.trim().is_empty() {
        return Err(ApiError::bad_request("keywords must not be empty"));
    }

    let params = pipeline::SearchParams {
        keywords: request.keywords,
        platform: request.platform,
        location: request.location,
        contact_info: request.contact_info,
        limit: request.limit.clamp(1, MAX_SEARCH_LIMIT),
    };

    let leads = pipeline::search_stage(&state.finder, &params).await;
    Ok(Json(leads))
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    leads: Vec<Lead>,
    #[serde(default)]
    service_type: Option<String>,
    /// Fetch lead pages before analysis; defaults to true.
    #[serde(default = "default_true")]
    fetch_pages: bool,
}

fn default_true() -> bool {
    true
}

async fn analyze_leads(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<Vec<AnalyzedLead>>, ApiError> {
    let service_type = request
        .service_type
        .unwrap_or_else(|| state.config.service_type().to_string());

    let analyzer = LeadAnalyzer::new(Arc::clone(&state.llm), service_type)
        .map_err(|e| ApiError::internal(format!("{:#}", e)))?
        .with_page_fetch(request.fetch_pages);

    let analyzed = pipeline::analyze_stage(&analyzer, &request.leads).await;
    Ok(Json(analyzed))
}

#[derive(Debug, Deserialize)]
struct EmailRequest {
    leads: Vec<AnalyzedLead>,
    #[serde(default)]
    service_type: Option<String>,
    /// Force "basic" or "personalized" instead of selecting by analysis.
    #[serde(default)]
    template: Option<String>,
}

async fn generate_emails(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EmailRequest>,
) -> Result<Json<Vec<EmailDraft>>, ApiError> {
    let service_type = request
        .service_type
        .unwrap_or_else(|| state.config.service_type().to_string());

    let template = match request.template.as_deref() {
        Some(name) => Some(TemplateKind::parse(name).ok_or_else(|| {
            ApiError::bad_request(format!(
                "unknown template `{}` (expected basic or personalized)",
                name
            ))
        })?),
        None => None,
    };

    let mut generator = EmailGenerator::new(
        Arc::clone(&state.llm),
        service_type,
        state.config.sender.clone(),
        state.config.template_dir.as_deref(),
    )
    .map_err(|e| ApiError::internal(format!("{:#}", e)))?;

    if let Some(kind) = template {
        generator = generator.with_template(kind);
    }

    let drafts = pipeline::email_stage(&generator, &request.leads).await;
    Ok(Json(drafts))
}

#[derive(Debug, Serialize)]
struct TemplatesResponse {
    templates: Vec<&'static str>,
}

async fn list_templates() -> Json<TemplatesResponse> {
    Json(TemplatesResponse {
        templates: TemplateSet::names().to_vec(),
    })
}

#[derive(Debug, Serialize)]
struct ServiceTypesResponse {
    current_service_type: String,
    available_service_types: Vec<&'static str>,
}

async fn service_types(State(state): State<Arc<AppState>>) -> Json<ServiceTypesResponse> {
    Json(ServiceTypesResponse {
        current_service_type: state.config.service_type().to_string(),
        available_service_types: vec![
            "web_development",
            "graphic_design",
            "content_writing",
            "digital_marketing",
            "seo",
            "social_media_management",
            "video_editing",
            "photography",
            "consulting",
            "accounting",
            "it_support",
            "app_development",
        ],
    })
}
