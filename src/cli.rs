// CLI definitions and command dispatch

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::analyzer::LeadAnalyzer;
use crate::config::Config;
use crate::email::{EmailGenerator, TemplateKind};
use crate::leads::store;
use crate::llm::create_client;
use crate::pipeline::{self, SearchParams};
use crate::search::FinderChain;
use crate::server::{ApiServer, ServerConfig};

/// Prospector: find leads, analyze their needs, draft outreach emails.
#[derive(Parser)]
#[command(
    name = "prospector",
    version,
    about = "Lead generation and personalized outreach email pipeline",
    long_about = None,
)]
pub struct Cli {
    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Search for leads and write them to a stage file.
    Search {
        /// Keywords to search for (e.g. "dentist").
        #[arg(short, long)]
        keywords: String,

        /// Platform domain to restrict to (e.g. "instagram.com").
        #[arg(short, long)]
        platform: Option<String>,

        /// Location filter (e.g. "Minneapolis").
        #[arg(short, long)]
        location: Option<String>,

        /// Contact-info search operand (e.g. "@gmail.com OR contact").
        #[arg(long)]
        contact_info: Option<String>,

        /// Maximum number of leads.
        #[arg(long, default_value_t = 5)]
        limit: usize,

        /// Output JSON stage file.
        #[arg(short, long, default_value = "leads.json")]
        output: PathBuf,

        /// Also export the leads as CSV.
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Analyze leads from a stage file.
    Analyze {
        /// Input file with leads (.json or .csv).
        #[arg(short, long, default_value = "leads.json")]
        input: PathBuf,

        /// Output JSON stage file.
        #[arg(short, long, default_value = "analyzed_leads.json")]
        output: PathBuf,

        /// Service type override for this run.
        #[arg(short, long)]
        service_type: Option<String>,

        /// Skip fetching lead pages; analyze from lead metadata only.
        #[arg(long)]
        no_fetch: bool,
    },

    /// Generate outreach emails for analyzed leads.
    Email {
        /// Input file with analyzed leads.
        #[arg(short, long, default_value = "analyzed_leads.json")]
        input: PathBuf,

        /// Output JSON stage file.
        #[arg(short, long, default_value = "emails.json")]
        output: PathBuf,

        /// Also export the drafts as CSV.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Service type override for this run.
        #[arg(short, long)]
        service_type: Option<String>,

        /// Force a template: basic or personalized.
        #[arg(short, long)]
        template: Option<String>,
    },

    /// Start the HTTP API server.
    Api {
        /// Address to bind to.
        #[arg(long, default_value = "127.0.0.1:8000")]
        bind: String,
    },
}

/// Initialize tracing from PROSPECTOR_LOG / RUST_LOG, or the -v count.
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_env("PROSPECTOR_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Run the parsed command against the loaded configuration.
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Command::Search {
            keywords,
            platform,
            location,
            contact_info,
            limit,
            output,
            csv,
        } => {
            let finder = FinderChain::from_config(&config.search)?;
            let params = SearchParams {
                keywords,
                platform,
                location,
                contact_info,
                limit,
            };

            println!(
                "Searching for \"{}\" leads (strategies: {})...",
                params.keywords,
                finder.backend_names().join(" → ")
            );

            let leads = pipeline::search_stage(&finder, &params).await;

            store::save_json(&output, &leads)?;
            println!("Found {} leads, saved to {}", leads.len(), output.display());

            if let Some(csv_path) = csv {
                store::export_leads_csv(&csv_path, &leads)?;
                println!("Exported leads to {}", csv_path.display());
            }

            for lead in &leads {
                let contact = lead
                    .email
                    .clone()
                    .unwrap_or_else(|| format!("@{}", lead.handle));
                println!("  {} [{}] {}", lead.name, contact, lead.url);
            }
            Ok(())
        }

        Command::Analyze {
            input,
            output,
            service_type,
            no_fetch,
        } => {
            let leads = store::load_leads(&input)
                .with_context(|| format!("Failed to load leads from {}", input.display()))?;
            if leads.is_empty() {
                bail!("No leads in {}", input.display());
            }
            println!("Loaded {} leads from {}", leads.len(), input.display());

            let service_type =
                service_type.unwrap_or_else(|| config.service_type().to_string());
            let llm: Arc<dyn crate::llm::LlmClient> = Arc::from(create_client(&config.llm)?);
            let analyzer =
                LeadAnalyzer::new(llm, service_type.clone())?.with_page_fetch(!no_fetch);

            println!("Analyzing for {} services...", service_type);
            let analyzed = pipeline::analyze_stage(&analyzer, &leads).await;

            store::save_json(&output, &analyzed)?;
            println!(
                "Analyzed {} leads, saved to {}",
                analyzed.len(),
                output.display()
            );

            for entry in &analyzed {
                let opportunities = entry.analysis.opportunities.len();
                println!(
                    "  {}: {} opportunities, {} pain points",
                    entry.lead.name, opportunities, entry.analysis.pain_points.len()
                );
            }
            Ok(())
        }

        Command::Email {
            input,
            output,
            csv,
            service_type,
            template,
        } => {
            let analyzed = store::load_analyzed(&input).with_context(|| {
                format!("Failed to load analyzed leads from {}", input.display())
            })?;
            if analyzed.is_empty() {
                bail!("No analyzed leads in {}", input.display());
            }
            println!(
                "Loaded {} analyzed leads from {}",
                analyzed.len(),
                input.display()
            );

            let forced = match template.as_deref() {
                Some(name) => Some(TemplateKind::parse(name).with_context(|| {
                    format!("Unknown template `{}` (expected basic or personalized)", name)
                })?),
                None => None,
            };

            let service_type =
                service_type.unwrap_or_else(|| config.service_type().to_string());
            let llm: Arc<dyn crate::llm::LlmClient> = Arc::from(create_client(&config.llm)?);
            let mut generator = EmailGenerator::new(
                llm,
                service_type,
                config.sender.clone(),
                config.template_dir.as_deref(),
            )?;
            if let Some(kind) = forced {
                generator = generator.with_template(kind);
            }

            let drafts = pipeline::email_stage(&generator, &analyzed).await;

            store::save_json(&output, &drafts)?;
            println!(
                "Generated {} emails, saved to {}",
                drafts.len(),
                output.display()
            );

            if let Some(csv_path) = csv {
                store::export_drafts_csv(&csv_path, &drafts)?;
                println!("Exported emails to {}", csv_path.display());
            }

            for draft in drafts.iter().take(10) {
                println!("  {} → {}", draft.to_name, draft.subject);
            }
            if drafts.len() > 10 {
                println!("  ... and {} more", drafts.len() - 10);
            }
            Ok(())
        }

        Command::Api { bind } => {
            let server = ApiServer::new(config, ServerConfig { bind_address: bind })?;
            println!("Press Ctrl+C to stop the server");
            server.serve().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_search_defaults() {
        let cli = Cli::parse_from(["prospector", "search", "--keywords", "dentist"]);
        match cli.command {
            Command::Search { keywords, limit, output, .. } => {
                assert_eq!(keywords, "dentist");
                assert_eq!(limit, 5);
                assert_eq!(output, PathBuf::from("leads.json"));
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn test_stage_file_defaults_chain() {
        let analyze = Cli::parse_from(["prospector", "analyze"]);
        match analyze.command {
            Command::Analyze { input, output, .. } => {
                assert_eq!(input, PathBuf::from("leads.json"));
                assert_eq!(output, PathBuf::from("analyzed_leads.json"));
            }
            _ => panic!("expected analyze command"),
        }

        let email = Cli::parse_from(["prospector", "email"]);
        match email.command {
            Command::Email { input, output, .. } => {
                assert_eq!(input, PathBuf::from("analyzed_leads.json"));
                assert_eq!(output, PathBuf::from("emails.json"));
            }
            _ => panic!("expected email command"),
        }
    }
}
