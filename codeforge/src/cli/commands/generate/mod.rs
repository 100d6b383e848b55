//! `codeforge generate`: single-file generation via the Orchestrator's `generate_code` loop.

use crate::cli::app::GenerateArgs;
use crate::cli::commands::{credentials_to_map, load_settings_and_provider, log_progress};
use anyhow::{bail, Result};
use codeforge_core::agents::Orchestrator;

pub async fn execute(args: GenerateArgs, config_path: Option<&std::path::Path>) -> Result<()> {
    let requirement = read_requirement(args.requirement.as_deref(), args.file.as_deref())?;

    let (mut settings, provider) = load_settings_and_provider(config_path)?;
    if args.no_persist {
        settings.enable_session_persistence = false;
    }

    let orchestrator = Orchestrator::new(provider, settings);
    let credentials = credentials_to_map(&args.credentials);
    let progress = |message: &str, iteration: u32| log_progress(message, iteration);

    let session = orchestrator
        .generate_code(&requirement, args.language.into(), args.max_iterations, credentials, Some(&progress))
        .await;

    if let (Some(output), Some(file)) = (args.output.as_ref(), session.final_code.as_ref()) {
        std::fs::write(output, &file.code)?;
        println!("Wrote {}", output.display());
    }

    println!("Session {}: {}", session.session_id, if session.success { "success" } else { "failed" });
    println!("Iterations: {}", session.iterations.len());
    if !session.missing_credentials.is_empty() {
        println!("Missing credentials: {}", session.missing_credentials.join(", "));
    }
    if let Some(file) = &session.final_code {
        println!("--- {} ---", file.filename);
        println!("{}", file.code);
    }

    if !session.success {
        bail!("generation did not succeed within {} iteration(s)", session.iterations.len());
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
