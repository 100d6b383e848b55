//! Runs external processes (installer, compiler, test runner) with a timeout, a working
//! directory, and captured stdout/stderr/exit code (§4.5, §4.6, §6).
//!
//! The `Command::new(...).args(...).output()` invocation shape generalized to
//! `tokio::process::Command` + `tokio::time::timeout` so the async Orchestrator loop can await
//! it directly, plus the Maven/pip binary discovery chains (PATH, then common install
//! locations, then a wrapper script).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{argv0} timed out after {timeout_secs}s")]
    Timeout { argv0: String, timeout_secs: u64 },

    #[error("failed to spawn {argv0}: {source}")]
    Spawn { argv0: String, source: std::io::Error },

    #[error("{tool} not found on PATH, in common install locations, or via a wrapper script")]
    NotFound { tool: String },
}

#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Executes external tools with a bounded wall-clock timeout.
pub struct ToolRunner;

impl ToolRunner {
    /// Run `argv[0] argv[1..]` in `cwd` (or the current directory), with an optional timeout
    /// and extra environment variables.
    pub async fn run(
        argv: &[String],
        cwd: Option<&Path>,
        timeout: Duration,
        env: Option<&HashMap<String, String>>,
    ) -> Result<ToolOutput, ToolError> {
        let (program, args) = argv.split_first().expect("argv must be non-empty");

        let mut command = Command::new(program);
        command.args(args);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }
        if let Some(vars) = env {
            command.envs(vars);
        }
        command.kill_on_drop(true);

        let spawned = command.output();
        let output = tokio::time::timeout(timeout, spawned)
            .await
            .map_err(|_| ToolError::Timeout { argv0: program.clone(), timeout_secs: timeout.as_secs() })?
            .map_err(|source| ToolError::Spawn { argv0: program.clone(), source })?;

        Ok(ToolOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Locate a named binary: first via `PATH`, then a fixed list of common install locations,
    /// finally a wrapper script (`<name>w`/`<name>.cmd`-style) in `project_root` or its parent.
    /// Mirrors the original's Maven discovery chain, generalized to any tool name.
    pub fn discover(tool_name: &str, fallback_dirs: &[PathBuf], project_root: Option<&Path>) -> Option<PathBuf> {
        if let Ok(path_var) = std::env::var("PATH") {
            for dir in std::env::split_paths(&path_var) {
                let candidate = dir.join(tool_name);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }

        for dir in fallback_dirs {
            let candidate = dir.join(tool_name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        if let Some(root) = project_root {
            for wrapper in [format!("{tool_name}w"), format!("{tool_name}w.cmd")] {
                let candidate = root.join(&wrapper);
                if candidate.is_file() {
                    return Some(candidate);
                }
                let parent_candidate = root.join("..").join(&wrapper);
                if parent_candidate.is_file() {
                    return Some(parent_candidate);
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn runs_a_trivial_command() {
        let output =
            ToolRunner::run(&["echo".to_string(), "hello".to_string()], None, Duration::from_secs(5), None)
                .await
                .unwrap();
        assert!(output.is_success());
        assert!(output.stdout.contains("hello"));
    }

    #[tokio::test]
    async fn nonzero_exit_is_not_an_error() {
        let output = ToolRunner::run(
            &["sh".to_string(), "-c".to_string(), "exit 3".to_string()],
            None,
            Duration::from_secs(5),
            None,
        )
        .await
        .unwrap();
        assert_eq!(output.exit_code, 3);
        assert!(!output.is_success());
    }

    #[tokio::test]
    async fn timeout_is_reported() {
        let result = ToolRunner::run(
            &["sleep".to_string(), "5".to_string()],
            None,
            Duration::from_millis(50),
            None,
        )
        .await;
        assert!(matches!(result, Err(ToolError::Timeout { .. })));
    }

    #[test]
    fn discover_returns_none_for_unknown_tool() {
        assert!(ToolRunner::discover("definitely-not-a-real-tool-xyz", &[], None).is_none());
    }
}
