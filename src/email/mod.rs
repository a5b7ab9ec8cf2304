// Email generation
//
// Template selection, model-written narrative fields, and rendering.

use serde::{Deserialize, Serialize};

mod generator;
mod template;
mod templates;

pub use generator::EmailGenerator;
pub use template::{Template, TemplateError};
pub use templates::{TemplateKind, TemplateSet, BASIC_TEMPLATE, PERSONALIZED_TEMPLATE};

/// The final pipeline output: one outreach email per analyzed lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailDraft {
    pub lead_id: String,
    pub to_name: String,
    pub to_business: String,
    pub subject: String,
    pub body: String,
}
