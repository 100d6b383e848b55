//! Data model shared by every agent in the pipeline.
//!
//! Field-for-field grounded in the original `src/models/schemas.py` Pydantic models; the
//! enums and structs here are the typed Rust counterpart of that schema (see `DESIGN.md`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Supported target languages for generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgrammingLanguage {
    Python,
    Java,
}

impl ProgrammingLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgrammingLanguage::Python => "python",
            ProgrammingLanguage::Java => "java",
        }
    }
}

impl std::fmt::Display for ProgrammingLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-stage execution status recorded on an `IterationLog`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    #[default]
    Pending,
    Running,
    Success,
    Failed,
    Skipped,
}

/// The five-member error classification taxonomy (§4.7, §7).
///
/// Unknown serialized values (from older or schema-drifted sessions) must be coerced to
/// `Logic` rather than rejected — see `ErrorKind::from_str_lenient` and the migration-aware
/// loader in `session::persistence`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Syntax,
    Build,
    Runtime,
    Logic,
    MissingCredentials,
}

impl ErrorKind {
    /// Parse a persisted `error_kind` string, collapsing anything unrecognized to `Logic`.
    /// This is the Rust equivalent of the original's load-time migration rule (§6).
    pub fn from_str_lenient(raw: &str) -> Self {
        match raw {
            "syntax" => ErrorKind::Syntax,
            "build" => ErrorKind::Build,
            "runtime" => ErrorKind::Runtime,
            "missing_credentials" => ErrorKind::MissingCredentials,
            _ => ErrorKind::Logic,
        }
    }
}

/// One assertion made during testing: `(name, status, description, error?)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub status: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Execution performance observed while testing a generated artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub execution_time_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_used_mb: Option<f64>,
}

/// Output of the Build Agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildResult {
    pub status: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub build_instructions: String,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub suggested_fixes: Vec<String>,
}

impl BuildResult {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Output of the Testing Agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub status: String,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
    #[serde(default)]
    pub execution_logs: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceMetrics>,
    #[serde(default)]
    pub issues_found: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl TestResult {
    pub fn is_success(&self) -> bool {
        self.status == "pass"
    }
}

/// Output of the Project Validator (§4.10). Warnings never flip `success`; only a
/// structural error (e.g. a Java package/path mismatch) does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    pub file_count: usize,
}

/// A single file produced by the Code Generator Agent. `language` is inferred from the
/// file extension and is *not* inherited from the session's target language (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileArtifact {
    pub filename: String,
    pub code: String,
    pub language: String,
    #[serde(default)]
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,
}

impl FileArtifact {
    pub fn new(filename: impl Into<String>, code: impl Into<String>, language: impl Into<String>) -> Self {
        let code = code.into();
        let size = code.len();
        Self { filename: filename.into(), code, language: language.into(), size, filepath: None }
    }
}

/// A canonical external dependency reference. Interpreter-ecosystem dependencies are a plain
/// name (optionally with a version specifier); JVM-ecosystem dependencies are a `group:artifact:version`
/// triple, kept structured in memory and joined with colons only at serialization time (§3, §6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dependency {
    Simple(String),
    Maven { group: String, artifact: String, version: String },
}

impl Dependency {
    pub fn simple(name: impl Into<String>) -> Self {
        Dependency::Simple(name.into())
    }

    pub fn maven(group: impl Into<String>, artifact: impl Into<String>, version: impl Into<String>) -> Self {
        Dependency::Maven { group: group.into(), artifact: artifact.into(), version: version.into() }
    }

    /// Canonical string form: bare name for simple deps, colon-joined triple for Maven deps.
    pub fn canonical(&self) -> String {
        match self {
            Dependency::Simple(name) => name.clone(),
            Dependency::Maven { group, artifact, version } => format!("{group}:{artifact}:{version}"),
        }
    }
}

/// An ordered list of file artifacts plus a de-duplicated, first-seen-order dependency list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratedBundle {
    pub files: Vec<FileArtifact>,
    pub dependencies: Vec<Dependency>,
}

impl GeneratedBundle {
    /// Insert a file, keeping the **last** occurrence when a filename repeats (§4.2 step 6).
    /// Returns `true` if this filename replaced an earlier one (caller logs a warning).
    pub fn upsert_file(&mut self, file: FileArtifact) -> bool {
        if let Some(existing) = self.files.iter_mut().find(|f| f.filename == file.filename) {
            *existing = file;
            true
        } else {
            self.files.push(file);
            false
        }
    }
}

/// Classified failure information produced by the Error Parser (§4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub error_kind: ErrorKind,
    pub root_cause: String,
    #[serde(default)]
    pub specific_issues: Vec<String>,
    #[serde(default)]
    pub suggested_fixes: Vec<String>,
    #[serde(default)]
    pub missing_credentials: Vec<String>,
    pub raw_error: String,
}

/// A historical error-kind tag as it may appear in a persisted session predating the current
/// taxonomy. Deserializing through this wrapper and then calling `.resolve()` implements the
/// load-time migration rule from §6: unknown values collapse to `Logic`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawErrorKind(pub String);

impl RawErrorKind {
    pub fn resolve(&self) -> ErrorKind {
        ErrorKind::from_str_lenient(&self.0)
    }
}

/// One pass through generate -> build -> test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationLog {
    pub iteration_number: u32,
    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub code_gen_status: AgentStatus,
    #[serde(default)]
    pub build_status: AgentStatus,
    #[serde(default)]
    pub test_status: AgentStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_result: Option<BuildResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_result: Option<TestResult>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_context: Option<String>,
}

impl IterationLog {
    pub fn new(iteration_number: u32) -> Self {
        Self {
            iteration_number,
            timestamp: Utc::now(),
            code_gen_status: AgentStatus::Pending,
            build_status: AgentStatus::Pending,
            test_status: AgentStatus::Pending,
            generated_code: None,
            build_result: None,
            test_result: None,
            error_kind: None,
            error_message: None,
            error_context: None,
        }
    }
}

/// A single-file code generation session. Mutated only by the Orchestrator; iteration logs
/// are append-only (§3 Lifecycle).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub requirements: String,
    pub language: ProgrammingLanguage,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub status: AgentStatus,
    #[serde(default)]
    pub current_iteration: u32,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    #[serde(default)]
    pub iterations: Vec<IterationLog>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_code: Option<FileArtifact>,

    #[serde(default)]
    pub runtime_credentials: HashMap<String, String>,
    #[serde(default)]
    pub missing_credentials: Vec<String>,

    #[serde(default)]
    pub total_execution_time: f64,
    #[serde(default)]
    pub success: bool,
}

fn default_max_iterations() -> u32 {
    5
}

impl Session {
    pub fn new(requirements: impl Into<String>, language: ProgrammingLanguage, max_iterations: u32) -> Self {
        let now = Utc::now();
        Self {
            session_id: short_session_id(),
            requirements: requirements.into(),
            language,
            created_at: now,
            updated_at: now,
            status: AgentStatus::Pending,
            current_iteration: 0,
            max_iterations,
            iterations: Vec::new(),
            final_code: None,
            runtime_credentials: HashMap::new(),
            missing_credentials: Vec::new(),
            total_execution_time: 0.0,
            success: false,
        }
    }
}

/// A multi-file project session, extending `Session` with scaffold/project fields (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSession {
    #[serde(flatten)]
    pub base: Session,

    #[serde(default)]
    pub project_template: String,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub files: Vec<FileArtifact>,
    #[serde(default)]
    pub file_tree: serde_json::Value,
    #[serde(default)]
    pub root_dir: String,
    #[serde(default)]
    pub has_dockerfile: bool,
    #[serde(default)]
    pub has_ci_config: bool,
    #[serde(default)]
    pub all_dependencies: Vec<String>,
}

impl ProjectSession {
    pub fn new(
        requirements: impl Into<String>,
        language: ProgrammingLanguage,
        max_iterations: u32,
        project_name: impl Into<String>,
        project_template: impl Into<String>,
    ) -> Self {
        Self {
            base: Session::new(requirements, language, max_iterations),
            project_template: project_template.into(),
            project_name: project_name.into(),
            files: Vec::new(),
            file_tree: serde_json::Value::Null,
            root_dir: String::new(),
            has_dockerfile: false,
            has_ci_config: false,
            all_dependencies: Vec::new(),
        }
    }
}

/// A lightweight, non-full-deserializing index entry produced by `list_sessions` (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub requirements_preview: String,
    pub language: ProgrammingLanguage,
    pub success: bool,
    pub updated_at: DateTime<Utc>,
}

/// Short random id used for new sessions; not cryptographically sensitive, just needs to be
/// unique enough to partition the persistence directory (§5 shared-resource policy).
pub fn short_session_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..12].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_migrates_unknown_values_to_logic() {
        assert_eq!(ErrorKind::from_str_lenient("syntax"), ErrorKind::Syntax);
        assert_eq!(ErrorKind::from_str_lenient("some_future_kind"), ErrorKind::Logic);
        assert_eq!(ErrorKind::from_str_lenient(""), ErrorKind::Logic);
    }

    #[test]
    fn dependency_canonical_form() {
        assert_eq!(Dependency::simple("requests").canonical(), "requests");
        assert_eq!(
            Dependency::maven("com.google.code.gson", "gson", "2.10.1").canonical(),
            "com.google.code.gson:gson:2.10.1"
        );
    }

    #[test]
    fn bundle_upsert_keeps_last_occurrence() {
        let mut bundle = GeneratedBundle::default();
        bundle.upsert_file(FileArtifact::new("src/main.py", "print('stub')", "python"));
        let replaced = bundle.upsert_file(FileArtifact::new("src/main.py", "print('final')", "python"));
        assert!(replaced);
        assert_eq!(bundle.files.len(), 1);
        assert_eq!(bundle.files[0].code, "print('final')");
    }

    #[test]
    fn session_starts_pending_with_no_iterations() {
        let session = Session::new("print hello", ProgrammingLanguage::Python, 3);
        assert_eq!(session.current_iteration, 0);
        assert!(session.iterations.is_empty());
        assert!(!session.success);
    }
}
