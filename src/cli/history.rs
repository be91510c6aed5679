// src/cli/history.rs — Session history commands

use super::render;
use crate::core::orchestrator::AuditOrchestrator;

pub async fn run_history(
    orchestrator: &AuditOrchestrator,
    limit: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let mut sessions = orchestrator.sessions().await;
    if let Some(limit) = limit {
        sessions.truncate(limit);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!("No sessions yet.");
        return Ok(());
    }
    for session in &sessions {
        println!("{}", render::session_line(session));
    }
    Ok(())
}

pub async fn run_show(
    orchestrator: &AuditOrchestrator,
    id: &str,
    json: bool,
    expand: bool,
) -> anyhow::Result<()> {
    let Some(session) = orchestrator.session(id).await else {
        anyhow::bail!("Session '{id}' not found");
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        print!("{}", render::session_detail(&session, expand));
    }
    Ok(())
}

pub async fn run_delete(orchestrator: &AuditOrchestrator, id: &str) -> anyhow::Result<()> {
    if !orchestrator.delete_session(id).await {
        anyhow::bail!("Session '{id}' not found");
    }
    println!("Deleted session {id}.");
    Ok(())
}

pub async fn run_clear(orchestrator: &AuditOrchestrator, yes: bool) -> anyhow::Result<()> {
    let count = orchestrator.sessions().await.len();
    if count == 0 {
        println!("Nothing to clear.");
        return Ok(());
    }
    if !yes {
        anyhow::bail!("This deletes {count} session(s). Re-run with --yes to confirm.");
    }
    orchestrator.clear_all().await;
    println!("Cleared {count} session(s).");
    Ok(())
}
