//! Sequences the agent pipeline: generate -> build -> test, with retry-context synthesis
//! between attempts and optional persistence of the finished session (§3, §4.1).
//!
//! Grounded on `orchestrator.py::generate_code`/`generate_project`: the strict per-iteration
//! ordering (a failure at any stage skips the remaining stages and starts the next iteration),
//! the accumulate-don't-short-circuit handling of `missing_credentials`, and
//! `_save_session`/`_save_project_session` for the on-disk record.

use super::{build_agent::BuildAgent, code_generator::CodeGeneratorAgent, error_parser, project_validator::ProjectValidatorAgent, retry_context, testing_agent::TestingAgent};
use crate::config::Settings;
use crate::llm::LLMProvider;
use crate::model::{AgentStatus, ErrorKind, FileArtifact, IterationLog, ProgrammingLanguage, ProjectSession, Session};
use crate::session::SessionStore;
use crate::templates::{get_template, Scaffolder};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Non-blocking progress notification: `(message, iteration_number)`. Called synchronously
/// from within the loop, so it must not block (§5 Concurrency & Resource Model).
pub type ProgressCallback<'a> = &'a (dyn Fn(&str, u32) + Send + Sync);

/// Coordinates the Code Generator, Build, Testing, Project Validator and Scaffolder agents
/// through the iterate-until-success loop.
pub struct Orchestrator {
    code_generator: CodeGeneratorAgent,
    build_agent: BuildAgent,
    testing_agent: TestingAgent,
    project_validator: ProjectValidatorAgent,
    settings: Settings,
}

impl Orchestrator {
    pub fn new(llm: Arc<dyn LLMProvider>, settings: Settings) -> Self {
        crate::info!("Orchestrator Agent initialized");
        Self {
            code_generator: CodeGeneratorAgent::new(llm.clone(), settings.agent_temperature),
            build_agent: BuildAgent::new(settings.clone()),
            testing_agent: TestingAgent::new(llm, settings.clone()),
            project_validator: ProjectValidatorAgent::new(),
            settings,
        }
    }

    /// Generates, builds and tests a single-file artifact, retrying with accumulated error
    /// context up to `max_iterations` times (or the configured default).
    pub async fn generate_code(
        &self,
        requirements: &str,
        language: ProgrammingLanguage,
        max_iterations: Option<u32>,
        runtime_credentials: HashMap<String, String>,
        progress: Option<ProgressCallback<'_>>,
    ) -> Session {
        let max_iterations = max_iterations.unwrap_or(self.settings.max_iterations);
        let mut session = Session::new(requirements, language, max_iterations);
        session.runtime_credentials = runtime_credentials;

        crate::info!("starting code generation session {}", session.session_id);
        let started = Instant::now();
        let mut error_context = String::new();

        for iteration in 1..=max_iterations {
            crate::info!("=== iteration {iteration}/{max_iterations} ===");
            let mut log = IterationLog::new(iteration);
            session.current_iteration = iteration;
            notify(progress, &format!("Iteration {iteration}: generating code..."), iteration);

            log.code_gen_status = AgentStatus::Running;
            let bundle = match self.code_generator.generate(requirements, language, &error_context).await {
                Ok(bundle) if !bundle.files.is_empty() => bundle,
                Ok(_) => {
                    log.code_gen_status = AgentStatus::Failed;
                    log.error_kind = Some(ErrorKind::Logic);
                    log.error_message = Some("Code generator did not return any code.".to_string());
                    session.iterations.push(log);
                    continue;
                }
                Err(err) => {
                    log.code_gen_status = AgentStatus::Failed;
                    log.error_message = Some(err.to_string());
                    session.iterations.push(log);
                    continue;
                }
            };

            let file = bundle.files.last().expect("checked non-empty above").clone();
            log.code_gen_status = AgentStatus::Success;
            log.generated_code = Some(file.code.clone());
            crate::info!("code generated successfully with {} dependencies", bundle.dependencies.len());
            notify(progress, &format!("Iteration {iteration}: code generated"), iteration);

            notify(progress, &format!("Iteration {iteration}: building code..."), iteration);
            log.build_status = AgentStatus::Running;
            let build_result = self.build_agent.analyze_and_build(&file.code, language, &bundle.dependencies).await;

            if !build_result.is_success() {
                crate::warn!("build failed, analyzing errors...");
                log.build_status = AgentStatus::Failed;
                let error_info = error_parser::parse(&build_result.errors.join("\n"), language.as_str(), Some(&file.code));
                apply_error_info(&mut session, &mut log, &error_info);
                error_context = retry_context::format(&error_info, iteration, max_iterations);
                log.build_result = Some(build_result);
                session.iterations.push(log);
                continue;
            }

            log.build_status = AgentStatus::Success;
            log.build_result = Some(build_result);
            crate::info!("build successful");
            notify(progress, &format!("Iteration {iteration}: build successful"), iteration);

            notify(progress, &format!("Iteration {iteration}: testing code..."), iteration);
            log.test_status = AgentStatus::Running;
            let test_result =
                self.testing_agent.execute_and_test(requirements, &file.code, language, &session.runtime_credentials).await;

            if !test_result.is_success() {
                crate::warn!("tests failed, analyzing issues...");
                log.test_status = AgentStatus::Failed;
                let mut issues = test_result.issues_found.clone();
                issues.push(test_result.execution_logs.clone());
                let error_info = error_parser::parse(&issues.join("\n"), language.as_str(), Some(&file.code));
                apply_error_info(&mut session, &mut log, &error_info);
                error_context = retry_context::format(&error_info, iteration, max_iterations);
                log.test_result = Some(test_result);
                session.iterations.push(log);
                continue;
            }

            log.test_status = AgentStatus::Success;
            log.test_result = Some(test_result);
            crate::info!("all tests passed");

            session.status = AgentStatus::Success;
            session.success = true;
            session.final_code = Some(file);
            session.iterations.push(log);
            break;
        }

        session.total_execution_time = started.elapsed().as_secs_f64();
        session.updated_at = chrono::Utc::now();

        if session.success {
            crate::info!("code generation successful in {} iteration(s)", session.iterations.len());
        } else {
            session.status = AgentStatus::Failed;
            crate::warn!("failed to generate working code after {max_iterations} iterations");
        }

        if self.settings.enable_session_persistence {
            let store = SessionStore::new(self.settings.session_storage_dir());
            if let Err(err) = store.save_session(&session).await {
                crate::error!("failed to save session: {err}");
            }
        }

        session
    }

    /// Scaffolds a multi-file project, then iterates generate -> validate -> build -> test
    /// across the whole file set (§4.9 feeds into §4.1).
    pub async fn generate_project(
        &self,
        requirements: &str,
        project_name: &str,
        project_template: &str,
        language: ProgrammingLanguage,
        root_dir: &std::path::Path,
        max_iterations: Option<u32>,
        runtime_credentials: HashMap<String, String>,
        progress: Option<ProgressCallback<'_>>,
    ) -> ProjectSession {
        let max_iterations = max_iterations.unwrap_or(self.settings.max_iterations);
        let mut session = ProjectSession::new(requirements, language, max_iterations, project_name, project_template);
        let started = Instant::now();

        crate::info!("starting project generation (id: {}, template: {project_template})", session.base.session_id);
        notify(progress, "Scaffolding project structure...", 0);

        let scaffold = match Scaffolder::scaffold(project_name, project_template, root_dir) {
            Ok(result) => result,
            Err(err) => {
                crate::error!("scaffolding error: {err}");
                session.base.status = AgentStatus::Failed;
                session.base.success = false;
                return session;
            }
        };

        session.root_dir = scaffold.project_root;
        session.file_tree = scaffold.file_tree;
        crate::info!("project scaffolded successfully at {}", session.root_dir);

        let template_structure = get_template(project_template).map(|t| t.structure.clone()).unwrap_or_default();
        let mut error_context = String::new();

        for iteration in 1..=max_iterations {
            let mut log = IterationLog::new(iteration);
            session.current_iteration = iteration;
            crate::info!("iteration {iteration}/{max_iterations}");
            notify(progress, &format!("Iteration {iteration}: generating code..."), iteration);

            log.code_gen_status = AgentStatus::Running;
            let bundle = match self
                .code_generator
                .generate_project(requirements, language, project_template, &template_structure, &error_context)
                .await
            {
                Ok(bundle) if !bundle.files.is_empty() => bundle,
                Ok(_) => {
                    crate::warn!("no files generated");
                    log.code_gen_status = AgentStatus::Failed;
                    session.iterations.push(log);
                    continue;
                }
                Err(err) => {
                    log.code_gen_status = AgentStatus::Failed;
                    log.error_message = Some(err.to_string());
                    session.iterations.push(log);
                    continue;
                }
            };

            let files: Vec<FileArtifact> = bundle
                .files
                .iter()
                .map(|f| {
                    let mut artifact = f.clone();
                    artifact.language = file_language(&artifact.filename, language);
                    artifact.filepath = Some(format!("{}/{}", session.root_dir, artifact.filename));
                    artifact
                })
                .collect();

            session.files = files.clone();
            session.all_dependencies = bundle.dependencies.iter().map(|d| d.canonical()).collect();
            log.code_gen_status = AgentStatus::Success;
            crate::info!("generated {} files with {} dependencies", files.len(), bundle.dependencies.len());

            notify(progress, &format!("Iteration {iteration}: validating project..."), iteration);
            log.build_status = AgentStatus::Running;
            let validation = self.project_validator.validate_project(&files, language);
            if !validation.success {
                crate::warn!("validation failed, analyzing errors...");
                log.build_status = AgentStatus::Failed;
                log.error_kind = Some(ErrorKind::Logic);
                log.error_message = Some(validation.errors.join("\n"));
                session.iterations.push(log);
                continue;
            }
            crate::info!("project validation successful");

            notify(progress, &format!("Iteration {iteration}: building project..."), iteration);
            let build_result = self.build_agent.build_project(&files, language, &bundle.dependencies).await;
            if !build_result.is_success() {
                crate::warn!("build failed, analyzing errors...");
                log.build_status = AgentStatus::Failed;
                log.error_message = Some(build_result.errors.join("\n"));
                session.iterations.push(log);
                continue;
            }
            log.build_status = AgentStatus::Success;
            crate::info!("project build successful");

            notify(progress, &format!("Iteration {iteration}: testing project..."), iteration);
            log.test_status = AgentStatus::Running;
            let test_result = self.testing_agent.test_project(requirements, &files, language, &runtime_credentials).await;
            if !test_result.is_success() {
                crate::warn!("tests failed");
                log.test_status = AgentStatus::Failed;
                log.test_result = Some(test_result);
                session.iterations.push(log);
                continue;
            }
            log.test_status = AgentStatus::Success;
            crate::info!("all tests passed");

            session.base.success = true;
            session.base.status = AgentStatus::Success;
            session.iterations.push(log);
            break;
        }

        session.base.total_execution_time = started.elapsed().as_secs_f64();
        session.base.updated_at = chrono::Utc::now();

        if session.base.success {
            crate::info!("project generation successful in {} iteration(s)", session.iterations.len());
        } else {
            session.base.status = AgentStatus::Failed;
            crate::warn!("failed to generate project after {max_iterations} iterations");
        }

        if self.settings.enable_session_persistence {
            let store = SessionStore::new(self.settings.session_storage_dir());
            if let Err(err) = store.save_project_session(&session).await {
                crate::error!("failed to save project session: {err}");
            }
        }

        session
    }
}

impl std::ops::Deref for ProjectSession {
    type Target = Session;
    fn deref(&self) -> &Session {
        &self.base
    }
}

impl std::ops::DerefMut for ProjectSession {
    fn deref_mut(&mut self) -> &mut Session {
        &mut self.base
    }
}

/// `missing_credentials` always overwrites and the loop keeps going; there is no short-circuit
/// back to the caller to request input (§9 Open Question: preserved as specified).
fn apply_error_info(session: &mut Session, log: &mut IterationLog, error_info: &crate::model::ErrorInfo) {
    log.error_kind = Some(error_info.error_kind);
    log.error_message = Some(error_info.root_cause.clone());
    if !error_info.missing_credentials.is_empty() {
        session.missing_credentials = error_info.missing_credentials.clone();
        crate::info!("missing credentials detected: {:?}", session.missing_credentials);
    }
}

/// Infers a file's own language from its extension, since a multi-file project can legitimately
/// mix source files with YAML/Dockerfile/etc. regardless of the project's target language (§3).
fn file_language(filename: &str, project_language: ProgrammingLanguage) -> String {
    if filename.ends_with(".py") || filename.ends_with("requirements.txt") {
        "python".to_string()
    } else if filename.ends_with(".java") || filename.ends_with("pom.xml") {
        "java".to_string()
    } else if filename.ends_with(".yml") || filename.ends_with(".yaml") || filename.ends_with("Dockerfile") {
        "yaml".to_string()
    } else {
        project_language.as_str().to_string()
    }
}

fn notify(progress: Option<ProgressCallback<'_>>, message: &str, iteration: u32) {
    if let Some(callback) = progress {
        callback(message, iteration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::MockProvider;

    fn test_settings(storage: &std::path::Path) -> Settings {
        let mut settings = Settings::default();
        settings.session_storage_path = storage.display().to_string();
        settings.max_iterations = 2;
        settings
    }

    #[tokio::test]
    async fn successful_generation_stops_after_first_passing_iteration() {
        let dir = tempfile::tempdir().unwrap();
        let llm: Arc<dyn LLMProvider> = Arc::new(MockProvider::new(vec![
            "# FILE: main.py\n```python\nprint('hello')\n```".to_string(),
            "{\"status\": \"pass\", \"test_cases\": [], \"execution_logs\": \"hello\", \"issues_found\": [], \"recommendations\": []}"
                .to_string(),
        ]));
        let orchestrator = Orchestrator::new(llm, test_settings(dir.path()));

        let session = orchestrator
            .generate_code("print hello", ProgrammingLanguage::Python, Some(1), HashMap::new(), None)
            .await;

        assert!(session.success);
        assert_eq!(session.iterations.len(), 1);
        assert!(session.final_code.is_some());
    }

    #[tokio::test]
    async fn build_failure_runs_every_iteration_and_ends_failed() {
        let dir = tempfile::tempdir().unwrap();
        // Unbalanced parenthesis: fails the Build Agent's syntax check every time, so the
        // loop never reaches the Testing Agent (no subprocess execution needed for this test).
        let broken = "# FILE: main.py\n```python\nprint('hello'\n```".to_string();
        let llm: Arc<dyn LLMProvider> = Arc::new(MockProvider::new(vec![broken]));
        let orchestrator = Orchestrator::new(llm, test_settings(dir.path()));

        let session =
            orchestrator.generate_code("print hello", ProgrammingLanguage::Python, Some(2), HashMap::new(), None).await;

        assert!(!session.success);
        assert_eq!(session.iterations.len(), 2);
        assert!(session.iterations.iter().all(|log| log.build_status == AgentStatus::Failed));
    }

    #[test]
    fn file_language_is_inferred_from_extension_not_project_language() {
        assert_eq!(file_language("Dockerfile", ProgrammingLanguage::Python), "yaml");
        assert_eq!(file_language("pom.xml", ProgrammingLanguage::Python), "java");
        assert_eq!(file_language("app.py", ProgrammingLanguage::Java), "python");
    }
}
