// Built-in email templates
//
// Two templates ship in the binary: `basic` for leads whose analysis came
// back empty, `personalized` for leads with real analysis substance. A
// template directory can override either by providing basic.txt or
// personalized.txt.
//
// The first rendered line carries the subject; the generator splits it off.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::template::Template;

pub const BASIC_TEMPLATE: &str = "\
Subject: Enhance Your {{ industry }} Business with Professional {{ service_type }}

Hi {{ name }},

I noticed your {{ platform }} presence, and I'm impressed with your work in the {{ industry }} industry.

{% if current_state %}
Based on my review, I see some opportunities to enhance your {{ service_type }}:
{% for opportunity in opportunities %}
- {{ opportunity }}
{% endfor %}
{% endif %}
Our {{ primary_service }} service could help you:
{% for benefit in benefits %}
- {{ benefit }}
{% endfor %}

I'd love to discuss how we could work together to improve your business.

Would you be available for a quick 15-minute call this week?

Best regards,
{{ sender_name }}
{{ sender_title }}
{{ sender_contact }}
";

pub const PERSONALIZED_TEMPLATE: &str = "\
Subject: {{ personalized_subject }}

Hi {{ name }},

I've been following your work at {{ business_name }} and I'm particularly impressed with your approach to {{ industry }}.

{% if current_state %}
I noticed your current {{ service_type }} and wanted to share some thoughts on how it could be enhanced:

{{ personalized_analysis }}
{% else %}
I noticed some opportunities to improve your {{ service_type }}, and wanted to share how professional services could benefit your business:

{{ personalized_value_proposition }}
{% endif %}
{% if opportunities %}
Specifically, I believe there are opportunities to:
{% for opportunity in opportunities %}
- {{ opportunity }}
{% endfor %}
{% endif %}
Our {{ primary_service }} service is designed for {{ industry }} professionals like you who want to:
{% for benefit in benefits %}
- {{ benefit }}
{% endfor %}

{{ personalized_pitch }}

I'd love to discuss this further. Would you be available for a quick call this week?

Best regards,
{{ sender_name }}
{{ sender_title }}
{{ sender_contact }}
";

/// Which template a draft is rendered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Basic,
    Personalized,
}

impl TemplateKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "basic" => Some(TemplateKind::Basic),
            "personalized" => Some(TemplateKind::Personalized),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TemplateKind::Basic => "basic",
            TemplateKind::Personalized => "personalized",
        }
    }
}

/// The parsed template pair used by the generator.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    pub basic: Template,
    pub personalized: Template,
}

impl TemplateSet {
    /// Load templates, preferring overrides from `dir` when present.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let basic = load_template(dir, "basic.txt", BASIC_TEMPLATE)?;
        let personalized = load_template(dir, "personalized.txt", PERSONALIZED_TEMPLATE)?;
        Ok(Self {
            basic,
            personalized,
        })
    }

    pub fn get(&self, kind: TemplateKind) -> &Template {
        match kind {
            TemplateKind::Basic => &self.basic,
            TemplateKind::Personalized => &self.personalized,
        }
    }

    pub fn names() -> &'static [&'static str] {
        &["basic", "personalized"]
    }
}

fn load_template(dir: Option<&Path>, filename: &str, builtin: &str) -> Result<Template> {
    let source = match dir {
        Some(dir) if dir.join(filename).exists() => {
            let path = dir.join(filename);
            fs::read_to_string(&path)
                .with_context(|| format!("Failed to read template {}", path.display()))?
        }
        _ => builtin.to_string(),
    };

    Template::parse(&source).with_context(|| format!("Failed to parse template {}", filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_templates_parse() {
        assert!(TemplateSet::load(None).is_ok());
    }

    #[test]
    fn test_template_kind_parsing() {
        assert_eq!(TemplateKind::parse("basic"), Some(TemplateKind::Basic));
        assert_eq!(
            TemplateKind::parse("Personalized"),
            Some(TemplateKind::Personalized)
        );
        assert_eq!(TemplateKind::parse("social"), None);
    }

    #[test]
    fn test_directory_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("basic.txt"),
            "Subject: Custom\n\nHi {{ name }}.\n",
        )
        .unwrap();

        let set = TemplateSet::load(Some(dir.path())).unwrap();
        let mut vars = serde_json::Map::new();
        vars.insert("name".to_string(), serde_json::Value::String("Ada".into()));

        let rendered = set.get(TemplateKind::Basic).render(&vars).unwrap();
        assert!(rendered.starts_with("Subject: Custom"));
        assert!(rendered.contains("Hi Ada."));
    }

    #[test]
    fn test_broken_override_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("basic.txt"), "{% if broken %}no end").unwrap();
        assert!(TemplateSet::load(Some(dir.path())).is_err());
    }
}
