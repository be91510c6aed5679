// src/cli/submit.rs — `submit` and `analyze` commands

use std::io::Read;

use super::render;
use crate::core::orchestrator::AuditOrchestrator;
use crate::core::types::Session;
use crate::infra::errors::AuditorError;

fn print_session(session: &Session, json: bool, expand: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(session)?);
    } else {
        print!("{}", render::session_detail(session, expand));
    }
    Ok(())
}

/// Narrative from args, or stdin when `--stdin` is set or no args were given.
pub fn read_narrative(args: &[String], stdin: bool) -> anyhow::Result<String> {
    if stdin || args.is_empty() {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(args.join(" "))
    }
}

pub async fn run_submit(
    orchestrator: &AuditOrchestrator,
    narrative: &str,
    images: Vec<String>,
    json: bool,
    expand: bool,
) -> anyhow::Result<()> {
    if !orchestrator.disclaimer_accepted().await {
        anyhow::bail!(
            "This tool is not therapy or medical advice. Run `ego-auditor disclaimer --accept` first."
        );
    }

    match orchestrator.submit(narrative, images).await {
        Ok(session) => print_session(&session, json, expand),
        Err(AuditorError::Validation(e)) => anyhow::bail!("{e}"),
        Err(e) => Err(e.into()),
    }
}

pub async fn run_analyze(
    orchestrator: &AuditOrchestrator,
    id: &str,
    json: bool,
    expand: bool,
) -> anyhow::Result<()> {
    let session = orchestrator.analyze_session(id).await?;
    print_session(&session, json, expand)
}
