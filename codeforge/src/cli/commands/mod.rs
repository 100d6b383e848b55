//! Command implementations, one module per subcommand.

pub mod generate;
pub mod scaffold;
pub mod sessions;
pub mod templates;

use codeforge_core::config::Settings;
use codeforge_core::llm::openai::OpenAICompatProvider;
use codeforge_core::llm::LLMProvider;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::cli::app::CredentialArg;

const LLM_HTTP_TIMEOUT_SECS: u64 = 120;

/// Loads settings (defaults -> config file -> env) and builds the one concrete LLM provider.
/// Shared by `generate` and `scaffold`, the two commands that actually need to call the
/// Orchestrator.
pub fn load_settings_and_provider(config_path: Option<&Path>) -> anyhow::Result<(Settings, Arc<dyn LLMProvider>)> {
    let settings = Settings::load(config_path, true)?;
    let provider = OpenAICompatProvider::new(
        settings.llm_provider.clone(),
        settings.llm_base_url.clone(),
        settings.llm_api_key.clone(),
        settings.llm_model_name.clone(),
        LLM_HTTP_TIMEOUT_SECS,
    )?;
    Ok((settings, Arc::new(provider)))
}

/// Loads settings without requiring an LLM key, for subcommands (`sessions`, `templates`) that
/// never call the LLM adapter.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    Ok(Settings::load(config_path, false)?)
}

pub fn credentials_to_map(credentials: &[CredentialArg]) -> HashMap<String, String> {
    credentials.iter().map(|c| (c.key.clone(), c.value.clone())).collect()
}

/// Renders a progress notification as a plain `info`-level log line (§6, §11 — no interactive
/// progress bar dependency).
pub fn log_progress(message: &str, iteration: u32) {
    if iteration > 0 {
        tracing::info!("[iteration {iteration}] {message}");
    } else {
        tracing::info!("{message}");
    }
}
