//! Extracts an ordered, de-duplicated list of external dependencies from generated source (§4.4).
//!
//! Grounded on `code_generator.py::_extract_dependencies`: the builtin/project-internal stdlib
//! sets, the `module_to_pip` map, and the Maven `import_to_maven` prefix map are reproduced
//! verbatim rather than approximated.

use crate::model::{Dependency, ProgrammingLanguage};
use once_cell::sync::Lazy;
use regex::Regex;

static PY_IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^import\s+(\w+)").unwrap());
static PY_FROM_IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^from\s+(\w+)").unwrap());
static PY_REQUIRES: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\s*REQUIRES:\s*(.+)").unwrap());

static JAVA_REQUIRES: Lazy<Regex> = Lazy::new(|| Regex::new(r"//\s*REQUIRES:\s*(.+)").unwrap());
static JAVA_IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^import\s+([\w.]+);").unwrap());

const PYTHON_BUILTINS: &[&str] = &[
    "os", "sys", "time", "datetime", "json", "csv", "re", "collections", "itertools", "functools",
    "math", "random", "logging", "typing", "unittest", "pathlib", "io", "subprocess", "tempfile",
    "shutil", "copy", "pickle", "threading", "multiprocessing", "argparse", "configparser",
    "email", "urllib", "http", "socket", "ssl", "asyncio", "hashlib", "hmac", "secrets", "uuid",
    "enum", "dataclasses", "abc", "sqlite3",
];

const PYTHON_PROJECT_MODULES: &[&str] = &[
    "src", "app", "tests", "test", "config", "utils", "models", "schemas", "database", "api",
    "core", "services", "controllers", "views", "main",
];

const MODULE_TO_PIP: &[(&str, &str)] = &[
    ("bs4", "beautifulsoup4"),
    ("PIL", "Pillow"),
    ("Pillow", "Pillow"),
    ("sklearn", "scikit-learn"),
    ("cv2", "opencv-python"),
    ("yaml", "PyYAML"),
    ("lxml", "lxml"),
    ("np", "numpy"),
    ("pd", "pandas"),
    ("pandas", "pandas"),
    ("numpy", "numpy"),
    ("requests", "requests"),
    ("matplotlib", "matplotlib"),
    ("bs", "beautifulsoup4"),
    ("scipy", "scipy"),
    ("sympy", "sympy"),
    ("seaborn", "seaborn"),
    ("scikit", "scikit-learn"),
];

const IMPORT_TO_MAVEN: &[(&str, (&str, &str, &str))] = &[
    ("com.google.gson", ("com.google.code.gson", "gson", "2.10.1")),
    ("org.apache.http", ("org.apache.httpcomponents.client5", "httpclient5", "5.3")),
    ("org.json", ("org.json", "json", "20231013")),
    ("com.fasterxml.jackson", ("com.fasterxml.jackson.core", "jackson-databind", "2.16.0")),
];

pub fn extract(code: &str, language: ProgrammingLanguage) -> Vec<Dependency> {
    match language {
        ProgrammingLanguage::Python => extract_python(code),
        ProgrammingLanguage::Java => extract_java(code),
    }
}

fn extract_python(code: &str) -> Vec<Dependency> {
    let mut raw: Vec<String> = Vec::new();
    raw.extend(PY_IMPORT.captures_iter(code).map(|c| c[1].to_string()));
    raw.extend(PY_FROM_IMPORT.captures_iter(code).map(|c| c[1].to_string()));

    if let Some(captures) = PY_REQUIRES.captures(code) {
        for dep in captures[1].split(',') {
            let dep = dep.trim();
            if !dep.is_empty() && !dep.starts_with('#') {
                raw.push(dep.to_string());
            }
        }
    }

    let filtered: Vec<String> = raw
        .into_iter()
        .filter(|d| {
            let lower = d.trim().to_lowercase();
            !lower.is_empty()
                && !PYTHON_BUILTINS.contains(&lower.as_str())
                && !PYTHON_PROJECT_MODULES.contains(&lower.as_str())
                && !lower.starts_with("none")
        })
        .collect();

    let mut normalized = Vec::new();
    for dep in &filtered {
        if dep.contains("==") || dep.contains(">=") || dep.contains("<=") {
            normalized.push(dep.clone());
            continue;
        }
        let top = dep.split('.').next().unwrap_or(dep);
        let pip_name = MODULE_TO_PIP.iter().find(|(m, _)| *m == top).map(|(_, pip)| *pip).unwrap_or(top);
        if !normalized.iter().any(|n: &String| n == pip_name) {
            normalized.push(pip_name.to_string());
        }
    }

    let mut seen = std::collections::HashSet::new();
    normalized.retain(|dep| seen.insert(dep.clone()));
    normalized.into_iter().map(Dependency::simple).collect()
}

fn extract_java(code: &str) -> Vec<Dependency> {
    let mut dependencies: Vec<Dependency> = Vec::new();

    if let Some(captures) = JAVA_REQUIRES.captures(code) {
        for dep_str in captures[1].split(',') {
            let parts: Vec<&str> = dep_str.trim().split(':').collect();
            if parts.len() == 3 {
                dependencies.push(Dependency::maven(parts[0], parts[1], parts[2]));
            }
        }
    }

    for captures in JAVA_IMPORT.captures_iter(code) {
        let imp = &captures[1];
        if imp.starts_with("java.") || imp.starts_with("javax.") {
            continue;
        }
        for (prefix, (group, artifact, version)) in IMPORT_TO_MAVEN {
            if imp.starts_with(prefix) {
                let dep = Dependency::maven(*group, *artifact, *version);
                if !dependencies.contains(&dep) {
                    dependencies.push(dep);
                }
                break;
            }
        }
    }

    dependencies
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_builtins_and_project_modules() {
        let code = "import os\nimport requests\nfrom utils import helper\nfrom bs4 import BeautifulSoup\n";
        let deps = extract(code, ProgrammingLanguage::Python);
        let names: Vec<String> = deps.iter().map(Dependency::canonical).collect();
        assert_eq!(names, vec!["requests".to_string(), "beautifulsoup4".to_string()]);
    }

    #[test]
    fn honors_requires_comment_and_dedupes() {
        let code = "# REQUIRES: httpx, pandas\nimport pandas\n";
        let deps = extract(code, ProgrammingLanguage::Python);
        let names: Vec<String> = deps.iter().map(Dependency::canonical).collect();
        assert_eq!(names, vec!["pandas".to_string(), "httpx".to_string()]);
    }

    #[test]
    fn maps_dotted_import_to_top_segment_package() {
        let code = "import scipy.stats\n";
        let deps = extract(code, ProgrammingLanguage::Python);
        assert_eq!(deps[0].canonical(), "scipy");
    }

    #[test]
    fn java_skips_jdk_namespaces_and_maps_known_imports() {
        let code = "import java.util.List;\nimport javax.sql.DataSource;\nimport com.google.gson.Gson;\n";
        let deps = extract(code, ProgrammingLanguage::Java);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].canonical(), "com.google.code.gson:gson:2.10.1");
    }

    #[test]
    fn java_requires_comment_parses_maven_triples() {
        let code = "// REQUIRES: org.json:json:20231013\nclass Foo {}\n";
        let deps = extract(code, ProgrammingLanguage::Java);
        assert_eq!(deps[0].canonical(), "org.json:json:20231013");
    }
}
