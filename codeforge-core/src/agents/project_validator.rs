//! Cross-file structural checks over a generated multi-file project (§4.10). Never rewrites
//! sources; only the JVM package/path mismatch is a hard error, everything else is a warning.
//!
//! Grounded on `project_validator.py` verbatim, including its warn-only philosophy for Python
//! import resolution and circular-import detection.

use crate::model::{FileArtifact, ProgrammingLanguage, ValidationResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

static IMPORT_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^import\s+([\w.,\s]+)").unwrap());
static FROM_IMPORT_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^from\s+([\w.]+)\s+import").unwrap());
static PACKAGE_DECL: Lazy<Regex> = Lazy::new(|| Regex::new(r"package\s+([\w.]+);").unwrap());

const PYTHON_STDLIB: &[&str] =
    &["os", "sys", "json", "re", "math", "time", "datetime", "collections", "itertools", "functools", "logging", "typing"];

fn extract_module_name(filename: &str) -> String {
    let stem = filename.strip_suffix(".py").unwrap_or(filename);
    stem.replace('/', ".")
}

fn extract_python_imports(code: &str) -> Vec<String> {
    let mut imports = Vec::new();
    for captures in IMPORT_LINE.captures_iter(code) {
        for module in captures[1].split(',') {
            if let Some(first) = module.trim().split_whitespace().next() {
                imports.push(first.to_string());
            }
        }
    }
    for captures in FROM_IMPORT_LINE.captures_iter(code) {
        imports.push(captures[1].to_string());
    }
    imports
}

/// Simplified bidirectional check: does any other file's import list contain this file's own
/// module name? Mirrors `_detect_circular_imports`'s O(n^2) scan and its first-hit-wins return.
fn detect_circular_import(imports_by_file: &HashMap<String, Vec<String>>) -> Option<String> {
    for (filename, _) in imports_by_file {
        let module_name = extract_module_name(filename);
        for (other_file, other_imports) in imports_by_file {
            if other_file != filename && other_imports.iter().any(|i| i == &module_name) {
                return Some(format!("{filename} <-> {other_file}"));
            }
        }
    }
    None
}

fn python_package_dirs(files: &[FileArtifact]) -> HashSet<String> {
    files
        .iter()
        .filter(|f| f.filename.ends_with(".py"))
        .filter_map(|f| f.filename.rsplit_once('/').map(|(dir, _)| dir.to_string()))
        .collect()
}

/// Always resolves: stdlib names, in-project files, and anything else (assumed third-party) all
/// count as valid. This mirrors the original's own always-true fallthrough — the warning this
/// feeds is effectively unreachable, same as upstream.
fn is_valid_python_import(imp: &str, files: &[FileArtifact]) -> bool {
    let _ = PYTHON_STDLIB.contains(&imp)
        || files.iter().filter(|f| f.filename.ends_with(".py")).any(|f| extract_module_name(&f.filename).starts_with(imp));
    true
}

/// Validates cross-file structure and records non-fatal findings (§4.10).
pub struct ProjectValidatorAgent;

impl ProjectValidatorAgent {
    pub fn new() -> Self {
        crate::info!("Project Validator Agent initialized");
        Self
    }

    pub fn validate_project(&self, files: &[FileArtifact], language: ProgrammingLanguage) -> ValidationResult {
        crate::info!("validating {} project with {} file(s)", language.as_str(), files.len());

        let (errors, warnings) = match language {
            ProgrammingLanguage::Python => self.validate_python_project(files),
            ProgrammingLanguage::Java => self.validate_java_project(files),
        };

        let success = errors.is_empty();
        if success {
            crate::info!("project validation passed");
        } else {
            crate::warn!("project validation found {} error(s)", errors.len());
        }

        ValidationResult { success, errors, warnings, file_count: files.len() }
    }

    fn validate_python_project(&self, files: &[FileArtifact]) -> (Vec<String>, Vec<String>) {
        let mut warnings = Vec::new();

        let imports_by_file: HashMap<String, Vec<String>> = files
            .iter()
            .filter(|f| f.language == "python" || f.filename.ends_with(".py"))
            .map(|f| (f.filename.clone(), extract_python_imports(&f.code)))
            .collect();

        if let Some(circular) = detect_circular_import(&imports_by_file) {
            warnings.push(format!("Potential circular imports detected: {circular}"));
        }

        for dir_path in python_package_dirs(files) {
            let has_init = files.iter().any(|f| f.filename == format!("{dir_path}/__init__.py"));
            if !has_init {
                warnings.push(format!("Missing __init__.py in {dir_path}"));
            }
        }

        for (filename, imports) in &imports_by_file {
            for imp in imports {
                if !is_valid_python_import(imp, files) {
                    warnings.push(format!("In {filename}: import '{imp}' not found in project"));
                }
            }
        }

        (Vec::new(), warnings)
    }

    fn validate_java_project(&self, files: &[FileArtifact]) -> (Vec<String>, Vec<String>) {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let java_files: Vec<&FileArtifact> = files.iter().filter(|f| f.language == "java" || f.filename.ends_with(".java")).collect();
        let in_main_tree: Vec<&&FileArtifact> = java_files.iter().filter(|f| f.filename.contains("/src/main/java/")).collect();

        if !java_files.is_empty() && in_main_tree.is_empty() {
            warnings.push(
                "Java files should ideally be in src/main/java/ for Maven compatibility; proceeding with validation".to_string(),
            );
        }

        for file in &java_files {
            let Some(captures) = PACKAGE_DECL.captures(&file.code) else {
                warnings.push(format!("Java file {} has no package declaration", file.filename));
                continue;
            };

            let package_name = &captures[1];
            if file.filename.contains("/src/main/java/") {
                let expected_suffix = package_name.replace('.', "/");
                if !file.filename.contains(&expected_suffix) {
                    errors.push(format!("Java file {} package '{package_name}' doesn't match path", file.filename));
                }
            }
        }

        (errors, warnings)
    }
}

impl Default for ProjectValidatorAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn py_file(name: &str, code: &str) -> FileArtifact {
        FileArtifact::new(name, code, "python")
    }

    fn java_file(name: &str, code: &str) -> FileArtifact {
        FileArtifact::new(name, code, "java")
    }

    #[test]
    fn python_import_warnings_never_produce_errors() {
        let files = vec![py_file("src/main.py", "import os\nimport totally_unknown_thing\n")];
        let agent = ProjectValidatorAgent::new();
        let result = agent.validate_project(&files, ProgrammingLanguage::Python);
        assert!(result.success);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn warns_on_missing_init_py() {
        let files = vec![py_file("src/pkg/mod.py", "x = 1\n")];
        let agent = ProjectValidatorAgent::new();
        let result = agent.validate_project(&files, ProgrammingLanguage::Python);
        assert!(result.warnings.iter().any(|w| w.contains("__init__.py")));
    }

    #[test]
    fn java_package_path_mismatch_under_main_tree_is_an_error() {
        let files =
            vec![java_file("proj/src/main/java/com/other/Foo.java", "package com.example;\npublic class Foo {}\n")];
        let agent = ProjectValidatorAgent::new();
        let result = agent.validate_project(&files, ProgrammingLanguage::Java);
        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn java_file_outside_main_tree_with_mismatch_is_warning_only() {
        let files = vec![java_file("Foo.java", "package com.example;\npublic class Foo {}\n")];
        let agent = ProjectValidatorAgent::new();
        let result = agent.validate_project(&files, ProgrammingLanguage::Java);
        assert!(result.success);
        assert!(result.errors.is_empty());
    }
}
