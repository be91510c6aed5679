// src/cli/status.rs — Status, connectivity and screening commands

use crate::core::orchestrator::AuditOrchestrator;
use crate::core::safety;
use crate::infra::config::Config;
use crate::infra::paths;

/// Display config, storage and session counts.
pub async fn show_status(config: &Config, orchestrator: &AuditOrchestrator) -> anyhow::Result<()> {
    let config_path = paths::config_file_path();
    let db_path = config.storage.database_path();
    let sessions = orchestrator.sessions().await;
    let analyzed = sessions.iter().filter(|s| s.is_complete).count();
    let crisis = sessions.iter().filter(|s| s.crisis_flagged()).count();

    println!("ego-auditor v{}", env!("CARGO_PKG_VERSION"));
    println!();

    if config_path.exists() {
        println!("  Config:     {} (loaded)", config_path.display());
    } else {
        println!("  Config:     (using defaults)");
    }

    if config.storage.in_memory {
        println!("  Storage:    in memory");
    } else if db_path.exists() {
        let size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);
        println!("  Storage:    {} ({})", db_path.display(), format_bytes(size));
    } else {
        println!("  Storage:    (not initialized)");
    }

    match config.remote.endpoint.as_deref() {
        Some(endpoint) => println!("  Endpoint:   {endpoint}"),
        None => println!("  Endpoint:   (not configured, local fallback only)"),
    }

    println!(
        "  Sessions:   {} total, {} analyzed, {} crisis-flagged",
        sessions.len(),
        analyzed,
        crisis
    );
    println!(
        "  Disclaimer: {}",
        if orchestrator.disclaimer_accepted().await {
            "accepted"
        } else {
            "not accepted"
        }
    );
    Ok(())
}

pub async fn run_ping(orchestrator: &AuditOrchestrator) -> anyhow::Result<()> {
    if orchestrator.test_connection().await {
        println!("Analysis endpoint reachable.");
        Ok(())
    } else {
        anyhow::bail!("Analysis endpoint unreachable; submissions will use the local fallback.")
    }
}

pub fn run_crisis_check(text: &str) {
    let matched = safety::matched_keywords(text);
    if matched.is_empty() {
        println!("No crisis language detected.");
        return;
    }
    println!("Crisis language detected: {}", matched.join(", "));
    for line in safety::emergency_contacts() {
        println!("  {line}");
    }
}

pub async fn run_disclaimer(
    orchestrator: &AuditOrchestrator,
    accept: bool,
    revoke: bool,
) -> anyhow::Result<()> {
    if accept || revoke {
        orchestrator.set_disclaimer_accepted(accept).await;
    }
    if orchestrator.disclaimer_accepted().await {
        println!("Disclaimer accepted.");
    } else {
        println!(
            "Disclaimer not accepted. This tool offers reflective prompts only; it is not \
             therapy, diagnosis or crisis care. Run with --accept to continue."
        );
    }
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
