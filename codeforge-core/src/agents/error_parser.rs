//! Classifies a raw error message into structured `ErrorInfo` (§4.7).
//!
//! Grounded verbatim in `utils/error_parser.py`'s regex constants and classification order.

use crate::model::{ErrorInfo, ErrorKind};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

static PYTHON_SYNTAX_ERROR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"SyntaxError: (.+?) \(line (\d+)\)").unwrap());
static PYTHON_IMPORT_ERROR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ModuleNotFoundError: No module named '(.+?)'").unwrap());
static PYTHON_NAME_ERROR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"NameError: name '(.+?)' is not defined").unwrap());

static JAVA_COMPILE_ERROR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+\.java):(\d+): error: (.+)").unwrap());
static JAVA_SYMBOL_ERROR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"cannot find symbol\s+symbol:\s+(\w+)\s+(\w+)").unwrap());
static JAVA_PACKAGE_ERROR: Lazy<Regex> = Lazy::new(|| Regex::new(r"package (.+?) does not exist").unwrap());
static JAVA_INCOMPATIBLE_TYPES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"incompatible types: (.+?) cannot be converted to (.+)").unwrap());
static JAVA_METHOD_ERROR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"cannot find symbol\s+symbol:\s+method (.+?)\(").unwrap());
static JAVA_CLASS_NOT_FOUND_EXCEPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ClassNotFoundException: (.+)").unwrap());

static DB_CONNECTION_ERROR: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"could not connect|connection refused|access denied").case_insensitive(true).build().unwrap()
});
static API_ERROR: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"HTTP Error (\d+)|ConnectionError|Timeout").case_insensitive(true).build().unwrap()
});
static MISSING_API_KEY: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"api[_\s]?key|authorization|authentication").case_insensitive(true).build().unwrap()
});
static API_KEY_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"api[_]?key\s*=\s*['\"]YOUR_|TODO|REPLACE").case_insensitive(true).build().unwrap()
});
static KNOWN_KEYED_ENDPOINT: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"api\.openweathermap\.org|api\.time\.io").case_insensitive(true).build().unwrap()
});

pub fn parse(error_message: &str, language: &str, code: Option<&str>) -> ErrorInfo {
    let missing_credentials = detect_missing_credentials(error_message, code);
    let mut error_kind = determine_error_kind(error_message, language);
    if !missing_credentials.is_empty() {
        error_kind = ErrorKind::MissingCredentials;
    }
    let root_cause = extract_root_cause(error_message, error_kind, language);
    let specific_issues = extract_specific_issues(error_message);
    let suggested_fixes = suggest_fixes(error_kind, language);

    ErrorInfo {
        error_kind,
        root_cause,
        specific_issues,
        suggested_fixes,
        missing_credentials,
        raw_error: error_message.to_string(),
    }
}

fn determine_error_kind(error_message: &str, language: &str) -> ErrorKind {
    let lower = error_message.to_lowercase();

    if MISSING_API_KEY.is_match(error_message) {
        return ErrorKind::MissingCredentials;
    }

    match language {
        "python" => {
            if lower.contains("syntaxerror") || lower.contains("indentationerror") {
                return ErrorKind::Syntax;
            }
            if lower.contains("modulenotfounderror") || lower.contains("importerror") {
                return ErrorKind::Build;
            }
            if DB_CONNECTION_ERROR.is_match(error_message) || API_ERROR.is_match(error_message) {
                return ErrorKind::Runtime;
            }
            if ["nameerror", "typeerror", "valueerror"].iter().any(|e| lower.contains(e)) {
                return ErrorKind::Runtime;
            }
        }
        "java" => {
            if lower.contains("error:") && lower.contains(".java:") {
                return ErrorKind::Syntax;
            }
            if lower.contains("class not found") || lower.contains("classnotfoundexception") {
                return ErrorKind::Runtime;
            }
            if lower.contains("package does not exist") {
                return ErrorKind::Build;
            }
            if lower.contains("cannot find symbol") {
                return ErrorKind::Syntax;
            }
            if lower.contains("nosuchmethoderror") || lower.contains("nosuchfielderror") {
                return ErrorKind::Runtime;
            }
        }
        _ => {}
    }

    ErrorKind::Logic
}

fn extract_root_cause(error_message: &str, error_kind: ErrorKind, language: &str) -> String {
    if error_kind == ErrorKind::MissingCredentials {
        return "Required API keys or credentials are missing".to_string();
    }

    match language {
        "python" => {
            if let Some(c) = PYTHON_IMPORT_ERROR.captures(error_message) {
                return format!("Missing Python package: {}", &c[1]);
            }
            if let Some(c) = PYTHON_SYNTAX_ERROR.captures(error_message) {
                return format!("Syntax error on line {}: {}", &c[2], &c[1]);
            }
            if let Some(c) = PYTHON_NAME_ERROR.captures(error_message) {
                return format!("Undefined variable or function: {}", &c[1]);
            }
        }
        "java" => {
            if let Some(c) = JAVA_COMPILE_ERROR.captures(error_message) {
                return format!("Compilation error in {} line {}: {}", &c[1], &c[2], &c[3]);
            }
            if let Some(c) = JAVA_PACKAGE_ERROR.captures(error_message) {
                return format!("Missing dependency: package {} not found", &c[1]);
            }
            if let Some(c) = JAVA_SYMBOL_ERROR.captures(error_message) {
                return format!("Undefined {}: {}", &c[1], &c[2]);
            }
            if error_message.contains("ClassNotFoundException") {
                let class_name = JAVA_CLASS_NOT_FOUND_EXCEPTION
                    .captures(error_message)
                    .map(|c| c[1].to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                return format!("Class not found at runtime: {class_name}");
            }
            if error_message.contains("NoSuchMethodError") {
                return "Method signature mismatch - wrong method called or dependency version conflict"
                    .to_string();
            }
        }
        _ => {}
    }

    match error_message.trim().lines().next() {
        Some(first) => first.chars().take(200).collect(),
        None => "Unknown error".to_string(),
    }
}

fn extract_specific_issues(error_message: &str) -> Vec<String> {
    let mut issues = Vec::new();

    for c in PYTHON_IMPORT_ERROR.captures_iter(error_message) {
        issues.push(format!("Missing package: {}", &c[1]));
    }
    for c in PYTHON_SYNTAX_ERROR.captures_iter(error_message) {
        issues.push(format!("Line {}: {}", &c[2], &c[1]));
    }
    for c in JAVA_COMPILE_ERROR.captures_iter(error_message) {
        issues.push(format!("{}:{} - {}", &c[1], &c[2], &c[3]));
    }
    if JAVA_SYMBOL_ERROR.is_match(error_message) {
        issues.push("Cannot find symbol - missing import or undefined variable/method".to_string());
    }
    for c in JAVA_PACKAGE_ERROR.captures_iter(error_message) {
        issues.push(format!("Package not found: {} - add Maven dependency", &c[1]));
    }
    for c in JAVA_INCOMPATIBLE_TYPES.captures_iter(error_message) {
        issues.push(format!("Type mismatch: {} cannot convert to {}", &c[1], &c[2]));
    }
    for c in JAVA_METHOD_ERROR.captures_iter(error_message) {
        issues.push(format!("Method not found: {}", &c[1]));
    }
    if error_message.contains("ClassNotFoundException") {
        issues.push("Class not found at runtime - check classpath or Maven dependencies".to_string());
    }
    if error_message.contains("NoSuchMethodError") {
        issues.push("Method not found at runtime - dependency version conflict or wrong method signature".to_string());
    }
    if DB_CONNECTION_ERROR.is_match(error_message) {
        issues.push("Database connection failed - verify the service is running and credentials are correct".to_string());
    }
    if API_ERROR.is_match(error_message) {
        issues.push("External API call failed - check network connectivity and API endpoint".to_string());
    }

    if issues.is_empty() {
        issues.push("See raw error for details".to_string());
    }
    issues
}

fn suggest_fixes(error_kind: ErrorKind, language: &str) -> Vec<String> {
    match error_kind {
        ErrorKind::Syntax => vec![
            "Review code syntax and fix any typos or structural errors".to_string(),
            "Ensure proper indentation (Python) or bracket matching (Java)".to_string(),
        ],
        ErrorKind::Build => {
            if language == "python" {
                vec![
                    "Add missing packages to requirements.txt".to_string(),
                    "Ensure all imports are available and correctly spelled".to_string(),
                ]
            } else {
                vec![
                    "Add missing Maven dependencies to pom.xml".to_string(),
                    "Verify package names and imports".to_string(),
                    "Check Maven repository connectivity".to_string(),
                    "Use correct groupId:artifactId:version format".to_string(),
                ]
            }
        }
        ErrorKind::Runtime => vec![
            "Add proper error handling (try-except or try-catch)".to_string(),
            "Validate inputs and handle edge cases".to_string(),
            "Check external service availability (database, APIs)".to_string(),
        ],
        ErrorKind::MissingCredentials => vec![
            "Prompt user to provide required credentials".to_string(),
            "Add credential parameters to function signatures".to_string(),
        ],
        ErrorKind::Logic => vec![
            "Review algorithm logic and data flow".to_string(),
            "Add debug logging to trace execution".to_string(),
            "Verify expected vs actual behavior".to_string(),
        ],
    }
}

fn detect_missing_credentials(error_message: &str, code: Option<&str>) -> Vec<String> {
    let mut missing = Vec::new();

    if MISSING_API_KEY.is_match(error_message) {
        missing.push("API Key or Authentication Token".to_string());
    }

    if let Some(code) = code {
        if API_KEY_PLACEHOLDER.is_match(code) {
            missing.push("API Key (found placeholder in code)".to_string());
        }
        if KNOWN_KEYED_ENDPOINT.is_match(code) {
            let lower = code.to_lowercase();
            if !lower.contains("api_key") && !lower.contains("apikey") {
                missing.push("API Key for external service".to_string());
            }
        }
    }

    missing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_takes_precedence_over_language_rules() {
        let info = parse("SyntaxError: invalid syntax (line 3); API key missing", "python", None);
        assert_eq!(info.error_kind, ErrorKind::MissingCredentials);
    }

    #[test]
    fn classifies_python_module_not_found_as_build() {
        let info = parse("ModuleNotFoundError: No module named 'requests'", "python", None);
        assert_eq!(info.error_kind, ErrorKind::Build);
        assert_eq!(info.root_cause, "Missing Python package: requests");
        assert!(info.specific_issues.iter().any(|i| i.contains("Missing package: requests")));
    }

    #[test]
    fn classifies_java_package_does_not_exist_as_build() {
        let info = parse("package com.google.gson does not exist", "java", None);
        assert_eq!(info.error_kind, ErrorKind::Build);
        assert!(info.root_cause.contains("com.google.gson"));
    }

    #[test]
    fn detects_placeholder_credentials_in_code() {
        let info = parse("401 unauthorized", "python", Some("api_key = 'YOUR_API_KEY_HERE'"));
        assert_eq!(info.error_kind, ErrorKind::MissingCredentials);
        assert!(info.missing_credentials.iter().any(|m| m.contains("placeholder")));
    }

    #[test]
    fn unrecognized_error_collapses_to_logic() {
        let info = parse("the widget did not widget correctly", "python", None);
        assert_eq!(info.error_kind, ErrorKind::Logic);
    }
}
