//! `codeforge sessions list` / `codeforge sessions show <id>`.

use crate::cli::app::SessionsCommand;
use crate::cli::commands::load_settings;
use anyhow::Result;
use codeforge_core::session::SessionStore;

pub async fn execute(command: SessionsCommand, config_path: Option<&std::path::Path>) -> Result<()> {
    let settings = load_settings(config_path)?;
    let store = SessionStore::new(settings.session_storage_dir());

    match command {
        SessionsCommand::List => list(&store).await,
        SessionsCommand::Show { id, json } => show(&store, &id, json).await,
    }
}

async fn list(store: &SessionStore) -> Result<()> {
    let summaries = store.list_sessions().await;
    if summaries.is_empty() {
        println!("No saved sessions.");
        return Ok(());
    }

    println!("{:<14} {:<8} {:<8} {:<20} REQUIREMENTS", "SESSION", "LANG", "STATUS", "UPDATED");
    for summary in summaries {
        println!(
            "{:<14} {:<8} {:<8} {:<20} {}",
            summary.session_id,
            summary.language.as_str(),
            if summary.success { "ok" } else { "failed" },
            summary.updated_at.format("%Y-%m-%d %H:%M:%S"),
            summary.requirements_preview,
        );
    }
    Ok(())
}

async fn show(store: &SessionStore, id: &str, json: bool) -> Result<()> {
    let session = store.load_session(id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }

    println!("session:      {}", session.session_id);
    println!("language:     {}", session.language.as_str());
    println!("status:       {:?}", session.status);
    println!("success:      {}", session.success);
    println!("iterations:   {}/{}", session.current_iteration, session.max_iterations);
    println!("elapsed:      {:.2}s", session.total_execution_time);
    if !session.missing_credentials.is_empty() {
        println!("missing:      {}", session.missing_credentials.join(", "));
    }
    println!("requirements: {}", session.requirements);
    for iteration in &session.iterations {
        println!(
            "  iteration {}: gen={:?} build={:?} test={:?}{}",
            iteration.iteration_number,
            iteration.code_gen_status,
            iteration.build_status,
            iteration.test_status,
            iteration.error_message.as_ref().map(|m| format!(" — {m}")).unwrap_or_default(),
        );
    }
    Ok(())
}
