// src/main.rs — ego-auditor entry point

use clap::Parser;
use std::sync::Arc;

use ego_auditor::api::{self, ApiState};
use ego_auditor::cli::{self, history, progress, status, submit, Cli, Commands};
use ego_auditor::infra::config::Config;
use ego_auditor::infra::{logger, paths};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG overrides either level
    logger::init_logging(if cli.verbose { "info" } else { "warn" });

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = if let Some(ref path) = cli.config {
        let mut config = Config::load_from(std::path::Path::new(path))?;
        config.apply_env(|key| std::env::var(key).ok());
        config
    } else {
        Config::load()?
    };

    // Screening needs no storage or network
    if let Commands::CrisisCheck { text } = &cli.command {
        status::run_crisis_check(&text.join(" "));
        return Ok(());
    }

    if !config.storage.in_memory && config.storage.database.is_none() {
        paths::ensure_dirs()?;
    }

    let orchestrator = cli::open_orchestrator(&config).await?;
    let json = cli.json;
    let expand = cli.verbose;

    match cli.command {
        Commands::Submit {
            narrative,
            stdin,
            images,
        } => {
            let text = submit::read_narrative(&narrative, stdin)?;
            let orchestrator = orchestrator.with_progress(progress::terminal_progress());
            submit::run_submit(&orchestrator, &text, images, json, expand).await
        }
        Commands::History { limit } => history::run_history(&orchestrator, limit, json).await,
        Commands::Show { id } => history::run_show(&orchestrator, &id, json, expand).await,
        Commands::Analyze { id } => {
            let orchestrator = orchestrator.with_progress(progress::terminal_progress());
            submit::run_analyze(&orchestrator, &id, json, expand).await
        }
        Commands::Delete { id } => history::run_delete(&orchestrator, &id).await,
        Commands::Clear { yes } => history::run_clear(&orchestrator, yes).await,
        Commands::Ping => status::run_ping(&orchestrator).await,
        Commands::Disclaimer { accept, revoke } => {
            status::run_disclaimer(&orchestrator, accept, revoke).await
        }
        Commands::Status => status::show_status(&config, &orchestrator).await,
        Commands::Serve { port } => {
            let mut api_config = config.api.clone();
            if let Some(port) = port {
                api_config.port = port;
            }
            let state = ApiState::new(Arc::new(orchestrator), &api_config);
            api::start_server(&api_config, state).await
        }
        Commands::CrisisCheck { .. } => Ok(()),
    }
}
