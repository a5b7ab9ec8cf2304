// Stage-boundary persistence
//
// Each pipeline stage reads its predecessor's output file and writes its
// own: leads.json → analyzed_leads.json → emails.json. CSV is supported as
// a secondary import/export format for flat records (leads, drafts).

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::analyzer::AnalyzedLead;
use crate::email::EmailDraft;
use crate::leads::Lead;

/// Write a value as pretty-printed JSON, creating parent directories.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Load a JSON stage file.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load leads from JSON or CSV, chosen by file extension.
pub fn load_leads(path: &Path) -> Result<Vec<Lead>> {
    if path.extension().and_then(|e| e.to_str()) == Some("csv") {
        import_leads_csv(path)
    } else {
        load_json(path)
    }
}

/// Load analyzed leads, dropping rows whose analysis does not reference the
/// lead it is attached to. A draft must never be generated from a lead that
/// skipped analysis.
pub fn load_analyzed(path: &Path) -> Result<Vec<AnalyzedLead>> {
    let rows: Vec<AnalyzedLead> = load_json(path)?;

    let mut valid = Vec::with_capacity(rows.len());
    for row in rows {
        if row.analysis.lead_id != row.lead.id {
            tracing::warn!(
                lead_id = %row.lead.id,
                analysis_ref = %row.analysis.lead_id,
                "Dropping analyzed lead with mismatched analysis reference"
            );
            continue;
        }
        valid.push(row);
    }
    Ok(valid)
}

/// Export leads as CSV.
pub fn export_leads_csv(path: &Path, leads: &[Lead]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for lead in leads {
        writer.serialize(lead)?;
    }
    writer.flush()?;
    Ok(())
}

/// Import leads from CSV. Malformed rows are logged and skipped; the rest
/// of the file still loads.
pub fn import_leads_csv(path: &Path) -> Result<Vec<Lead>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut leads = Vec::new();
    for (row, result) in reader.deserialize::<Lead>().enumerate() {
        match result {
            Ok(mut lead) => {
                if lead.id.is_empty() {
                    lead.id = uuid::Uuid::new_v4().to_string();
                }
                leads.push(lead);
            }
            Err(e) => {
                tracing::warn!("Skipping malformed CSV row {}: {}", row + 2, e);
            }
        }
    }
    Ok(leads)
}

/// Export drafts as CSV.
pub fn export_drafts_csv(path: &Path, drafts: &[EmailDraft]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for draft in drafts {
        writer.serialize(draft)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Analysis;

    fn lead(id: &str, url: &str) -> Lead {
        let mut lead = Lead::new(url);
        lead.id = id.to_string();
        lead.name = "Acme Dental".to_string();
        lead.email = Some("info@acmedental.com".to_string());
        lead
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.json");

        let leads = vec![lead("l-1", "https://acmedental.com")];
        save_json(&path, &leads).unwrap();

        let loaded: Vec<Lead> = load_json(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "l-1");
        assert_eq!(loaded[0].email.as_deref(), Some("info@acmedental.com"));
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.csv");

        let leads = vec![
            lead("l-1", "https://acmedental.com"),
            lead("l-2", "https://instagram.com/acme"),
        ];
        export_leads_csv(&path, &leads).unwrap();

        let loaded = import_leads_csv(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].id, "l-2");
    }

    #[test]
    fn test_load_leads_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("leads.csv");
        let json_path = dir.path().join("leads.json");

        let leads = vec![lead("l-1", "https://acmedental.com")];
        export_leads_csv(&csv_path, &leads).unwrap();
        save_json(&json_path, &leads).unwrap();

        assert_eq!(load_leads(&csv_path).unwrap().len(), 1);
        assert_eq!(load_leads(&json_path).unwrap().len(), 1);
    }

    #[test]
    fn test_load_analyzed_drops_mismatched_references() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analyzed_leads.json");

        let good = AnalyzedLead {
            lead: lead("l-1", "https://acmedental.com"),
            analysis: Analysis::empty_for_id("l-1"),
        };
        let bad = AnalyzedLead {
            lead: lead("l-2", "https://other.com"),
            analysis: Analysis::empty_for_id("l-9"),
        };
        save_json(&path, &vec![good, bad]).unwrap();

        let loaded = load_analyzed(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].lead.id, "l-1");
    }
}
