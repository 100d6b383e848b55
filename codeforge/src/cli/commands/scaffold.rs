//! `codeforge scaffold`: multi-file project generation via the Orchestrator's `generate_project`
//! loop (scaffold -> iterate generate/validate/build/test).

use crate::cli::app::ScaffoldArgs;
use crate::cli::commands::{credentials_to_map, load_settings_and_provider, log_progress};
use anyhow::{bail, Result};
use codeforge_core::agents::Orchestrator;

pub async fn execute(args: ScaffoldArgs, config_path: Option<&std::path::Path>) -> Result<()> {
    let requirement = read_requirement(args.requirement.as_deref(), args.file.as_deref())?;
    let project_name = args.project_name.clone().or_else(|| regex_utils::project_name::extract(&requirement)).unwrap_or_else(|| "generated-project".to_string());

    let (mut settings, provider) = load_settings_and_provider(config_path)?;
    if args.no_persist {
        settings.enable_session_persistence = false;
    }

    let orchestrator = Orchestrator::new(provider, settings);
    let credentials = credentials_to_map(&args.credentials);
    let progress = |message: &str, iteration: u32| log_progress(message, iteration);

    let session = orchestrator
        .generate_project(
            &requirement,
            &project_name,
            &args.template,
            args.language.into(),
            &args.output_dir,
            args.max_iterations,
            credentials,
            Some(&progress),
        )
        .await;

    println!("Session {}: {}", session.session_id, if session.success { "success" } else { "failed" });
    println!("Project: {}", project_name);
    println!("Project root: {}", session.root_dir);
    println!("Iterations: {}", session.iterations.len());
    println!("Files: {}", session.files.len());
    if !session.missing_credentials.is_empty() {
        println!("Missing credentials: {}", session.missing_credentials.join(", "));
    }

    if !session.success {
        bail!("project generation did not succeed within {} iteration(s)", session.iterations.len());
    }
    Ok(())
}

fn read_requirement(inline: Option<&str>, file: Option<&std::path::Path>) -> Result<String> {
    match (inline, file) {
        (_, Some(path)) => Ok(std::fs::read_to_string(path)?),
        (Some(text), None) => Ok(text.to_string()),
        (None, None) => bail!("provide a requirement on the command line or with --file"),
    }
}
