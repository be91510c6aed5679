// src/cli/mod.rs — CLI definition (clap derive)

pub mod history;
pub mod progress;
pub mod render;
pub mod status;
pub mod submit;

use clap::{Parser, Subcommand};
use std::sync::Arc;

use crate::core::orchestrator::AuditOrchestrator;
use crate::core::validation::NarrativeValidator;
use crate::infra::config::Config;
use crate::memory;
use crate::memory::store::SessionStore;
use crate::provider::remote::RemoteAnalysisClient;

#[derive(Parser)]
#[command(
    name = "ego-auditor",
    about = "Audit a personal narrative for distorted framing",
    version
)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Log at info level (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit a narrative for analysis
    Submit {
        /// Narrative text (joined with spaces)
        #[arg(trailing_var_arg = true)]
        narrative: Vec<String>,
        /// Read the narrative from stdin
        #[arg(long)]
        stdin: bool,
        /// Attach an image reference (repeatable, at most 5 kept)
        #[arg(long = "image")]
        images: Vec<String>,
    },
    /// List past sessions, newest first
    History {
        /// Show at most this many sessions
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show one session with its analysis
    Show { id: String },
    /// Re-run analysis for an existing session
    Analyze { id: String },
    /// Delete one session
    Delete { id: String },
    /// Delete all sessions
    Clear {
        /// Required to confirm deletion
        #[arg(long)]
        yes: bool,
    },
    /// Check that the analysis endpoint answers
    Ping,
    /// Run local crisis screening on some text (nothing is sent or stored)
    CrisisCheck {
        #[arg(trailing_var_arg = true, required = true)]
        text: Vec<String>,
    },
    /// Accept or revoke the usage disclaimer
    Disclaimer {
        #[arg(long, conflicts_with = "revoke")]
        accept: bool,
        #[arg(long)]
        revoke: bool,
    },
    /// Show config, storage and session counts
    Status,
    /// Serve the local HTTP API
    Serve {
        /// Port (defaults to `api.port`)
        #[arg(long)]
        port: Option<u16>,
    },
}

/// Wire the store and remote client from config.
pub async fn open_orchestrator(config: &Config) -> anyhow::Result<AuditOrchestrator> {
    let kv = memory::open_kv(&config.storage)?;
    let store = SessionStore::load(kv).await;
    let backend = Arc::new(RemoteAnalysisClient::from_config(config));
    Ok(AuditOrchestrator::new(backend, store)
        .with_validator(NarrativeValidator::submission_from_config(&config.validation)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_submit_with_images() {
        let cli = Cli::try_parse_from([
            "ego-auditor",
            "submit",
            "--image",
            "a.png",
            "--image",
            "b.png",
            "I",
            "felt",
            "invisible",
        ])
        .unwrap();
        match cli.command {
            Commands::Submit {
                narrative, images, ..
            } => {
                assert_eq!(narrative.join(" "), "I felt invisible");
                assert_eq!(images, vec!["a.png", "b.png"]);
            }
            _ => panic!("expected submit"),
        }
    }

    #[test]
    fn test_disclaimer_flags_conflict() {
        assert!(Cli::try_parse_from(["ego-auditor", "disclaimer", "--accept", "--revoke"]).is_err());
    }

    #[test]
    fn test_global_json_flag() {
        let cli = Cli::try_parse_from(["ego-auditor", "history", "--json", "-n", "3"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::History { limit: Some(3) }));
    }

    #[tokio::test]
    async fn test_open_orchestrator_in_memory() {
        let mut config = Config::default();
        config.storage.in_memory = true;
        let orchestrator = open_orchestrator(&config).await.unwrap();
        assert!(orchestrator.sessions().await.is_empty());
        assert!(!orchestrator.is_analyzing());
    }

    #[tokio::test]
    async fn test_clear_requires_yes() {
        let clear = Cli::command();
        let yes = clear
            .find_subcommand("clear")
            .and_then(|c| c.get_arguments().find(|a| a.get_id() == "yes"))
            .and_then(|a| a.get_help())
            .map(|h| h.to_string())
            .unwrap();
        assert_eq!(yes, "Required to confirm deletion");

        let mut config = Config::default();
        config.storage.in_memory = true;
        let orchestrator = open_orchestrator(&config).await.unwrap();
        orchestrator
            .submit(
                "My manager keeps moving deadlines and I never say anything about it.",
                vec![],
            )
            .await
            .unwrap();

        assert!(history::run_clear(&orchestrator, false).await.is_err());
        assert_eq!(orchestrator.sessions().await.len(), 1);

        history::run_clear(&orchestrator, true).await.unwrap();
        assert!(orchestrator.sessions().await.is_empty());
    }
}
