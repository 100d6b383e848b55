//! Validates generated code and, for Java, compiles it with Maven (§4.5).
//!
//! Grounded on `build_agent.py`: the Python path's dependency pre-filter plus `pip install`
//! invocation, and the Java path's package/class extraction, auto-detected Spring Boot
//! dependency enrichment, temp Maven project materialization, and compiler error parsing.
//! Python syntax validation is a structural scan rather than a literal `ast.parse` port (there is
//! no Python parser in this ecosystem to reach for; ecosystem crates like `syn` only parse Rust).

use crate::config::Settings;
use crate::model::{BuildResult, Dependency, FileArtifact, ProgrammingLanguage};
use crate::tools::runner::ToolRunner;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::Duration;

static PACKAGE_DECL: Lazy<Regex> = Lazy::new(|| Regex::new(r"package\s+([\w.]+);").unwrap());
static PUBLIC_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)public\s+class\s+(\w+)").unwrap());
static PUBLIC_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"public\s+(?:class|interface|enum|record)\s+(\w+)").unwrap());
static JAVA_IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^import\s+([\w.]+);").unwrap());
static JAVAC_ERROR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+\.java):(\d+):\s*error:\s*(.+)").unwrap());

const PROJECT_INTERNALS: &[&str] = &[
    "src", "app", "tests", "test", "config", "utils", "models", "schemas", "database", "api",
    "core", "services", "controllers", "views", "main", "lib", "common",
];

const STDLIB_MODULES: &[&str] = &[
    "logging", "typing", "json", "math", "itertools", "collections", "datetime", "re", "sys",
    "os", "unittest", "pathlib", "io", "subprocess", "tempfile", "shutil", "copy", "pickle",
    "threading", "multiprocessing", "argparse", "configparser", "email", "urllib", "http",
    "socket", "ssl", "asyncio", "hashlib", "hmac", "secrets", "uuid", "enum", "dataclasses",
    "abc", "time", "csv", "functools", "random", "string", "textwrap", "difflib", "warnings",
    "sqlite3", "dbm", "shelve",
];

/// import prefix -> (groupId, artifactId, version). Mirrors `_detect_java_dependencies`'s
/// `dependency_map`; first matching prefix wins.
const JAVA_DEPENDENCY_MAP: &[(&str, &str, &str, &str)] = &[
    ("com.google.gson", "com.google.code.gson", "gson", "2.10.1"),
    ("org.apache.http", "org.apache.httpcomponents", "httpclient", "4.5.14"),
    ("org.apache.commons.lang3", "org.apache.commons", "commons-lang3", "3.14.0"),
    ("org.json", "org.json", "json", "20231013"),
    ("com.fasterxml.jackson", "com.fasterxml.jackson.core", "jackson-databind", "2.16.0"),
    ("org.springframework.security.authentication", "org.springframework.boot", "spring-boot-starter-security", "3.1.5"),
    ("org.springframework.security.config", "org.springframework.boot", "spring-boot-starter-security", "3.1.5"),
    ("org.springframework.security.crypto", "org.springframework.boot", "spring-boot-starter-security", "3.1.5"),
    ("org.springframework.security", "org.springframework.boot", "spring-boot-starter-security", "3.1.5"),
    ("org.springframework.data.jpa", "org.springframework.boot", "spring-boot-starter-data-jpa", "3.1.5"),
    ("com.mysql", "org.mariadb.jdbc", "mariadb-java-client", "3.1.4"),
    ("mysql", "org.mariadb.jdbc", "mariadb-java-client", "3.1.4"),
    ("org.springframework.web", "org.springframework.boot", "spring-boot-starter-web", "3.1.5"),
    ("org.springframework.http", "org.springframework.boot", "spring-boot-starter-web", "3.1.5"),
    ("org.springframework.boot.actuate", "org.springframework.boot", "spring-boot-starter-actuator", "3.1.5"),
    ("org.springframework.boot", "org.springframework.boot", "spring-boot-starter-web", "3.1.5"),
    ("org.springframework", "org.springframework.boot", "spring-boot-starter-web", "3.1.5"),
    ("jakarta.persistence", "org.springframework.boot", "spring-boot-starter-data-jpa", "3.1.5"),
    ("jakarta.validation", "org.springframework.boot", "spring-boot-starter-validation", "3.1.5"),
    ("javax.validation", "org.springframework.boot", "spring-boot-starter-validation", "3.1.5"),
    ("jakarta.enterprise.context", "jakarta.enterprise", "jakarta.enterprise.cdi-api", "4.0.1"),
    ("jakarta.enterprise.inject", "jakarta.enterprise", "jakarta.enterprise.cdi-api", "4.0.1"),
    ("jakarta.inject", "jakarta.inject", "jakarta.inject-api", "2.0.1"),
    ("jakarta.", "org.springframework.boot", "spring-boot-starter-web", "3.1.5"),
    ("lombok", "org.projectlombok", "lombok", "1.18.26"),
    ("io.jsonwebtoken", "io.jsonwebtoken", "jjwt-api", "0.11.5"),
    ("org.junit", "org.junit.jupiter", "junit-jupiter-api", "5.10.0"),
    ("org.mockito", "org.mockito", "mockito-core", "5.5.0"),
    ("org.slf4j", "org.slf4j", "slf4j-simple", "2.0.9"),
    ("io.swagger.v3.oas", "org.springdoc", "springdoc-openapi-starter-webmvc-ui", "2.2.0"),
    ("org.springdoc", "org.springdoc", "springdoc-openapi-starter-webmvc-ui", "2.2.0"),
    ("org.apache.commons.dbcp2", "org.apache.commons", "commons-dbcp2", "2.11.0"),
];

#[derive(Clone, PartialEq, Eq)]
struct MavenDep {
    group: String,
    artifact: String,
    version: String,
}

impl MavenDep {
    fn coord(&self) -> String {
        format!("{}:{}:{}", self.group, self.artifact, self.version)
    }
}

fn push_unique(deps: &mut Vec<MavenDep>, dep: MavenDep) {
    if !deps.iter().any(|d| *d == dep) {
        deps.push(dep);
    }
}

fn dependency_to_maven(dep: &Dependency) -> Option<MavenDep> {
    match dep {
        Dependency::Maven { group, artifact, version } => {
            Some(MavenDep { group: group.clone(), artifact: artifact.clone(), version: version.clone() })
        }
        Dependency::Simple(s) => {
            let parts: Vec<&str> = s.split(':').collect();
            match parts.as_slice() {
                [group, artifact, version] => {
                    Some(MavenDep { group: group.to_string(), artifact: artifact.to_string(), version: version.to_string() })
                }
                _ => None,
            }
        }
    }
}

/// Auto-detects Maven dependencies from a Java source body's `import` lines (§4.5).
fn detect_java_dependencies(code: &str) -> Vec<MavenDep> {
    let mut detected = Vec::new();
    for captures in JAVA_IMPORT.captures_iter(code) {
        let imp = &captures[1];
        if imp.starts_with("java.") || imp.starts_with("javax.sql") || imp.starts_with("javax.naming") {
            continue;
        }
        if let Some((_, group, artifact, version)) = JAVA_DEPENDENCY_MAP.iter().find(|(prefix, ..)| imp.starts_with(prefix)) {
            detected.push(MavenDep { group: group.to_string(), artifact: artifact.to_string(), version: version.to_string() });
        }
    }
    detected
}

/// Adds the essential Spring Boot starters (web/JPA/validation, plus security/JWT/test when the
/// code signals their use) when the dependency set already contains a `org.springframework*`
/// groupId. Mirrors the enrichment step shared by `_build_java` and `_build_java_project`.
fn enrich_spring_starters(deps: &mut Vec<MavenDep>, has_security: bool, has_jwt: bool, has_tests: bool) {
    let has_spring = deps.iter().any(|d| d.group.starts_with("org.springframework"));
    if !has_spring {
        return;
    }

    let mut essential = vec![
        ("org.springframework.boot", "spring-boot-starter-web", "3.1.5"),
        ("org.springframework.boot", "spring-boot-starter-data-jpa", "3.1.5"),
        ("org.springframework.boot", "spring-boot-starter-validation", "3.1.5"),
    ];
    if has_security {
        essential.push(("org.springframework.boot", "spring-boot-starter-security", "3.1.5"));
    }
    if has_jwt {
        essential.push(("io.jsonwebtoken", "jjwt-api", "0.11.5"));
        essential.push(("io.jsonwebtoken", "jjwt-impl", "0.11.5"));
        essential.push(("io.jsonwebtoken", "jjwt-jackson", "0.11.5"));
    }
    if has_tests {
        essential.push(("org.springframework.boot", "spring-boot-starter-test", "3.1.5"));
    }

    for (group, artifact, version) in essential {
        let dep = MavenDep { group: group.to_string(), artifact: artifact.to_string(), version: version.to_string() };
        if !deps.iter().any(|d| *d == dep) {
            crate::info!("added essential Spring Boot starter: {}", dep.artifact);
            deps.push(dep);
        }
    }
}

/// Build-agent-specific pom.xml: Java 11 source/target and an `exec-maven-plugin` entry pointing
/// at `main_class`, distinct from the static Spring Boot project template's pom (Java 21, no exec
/// plugin) in `templates::registry`.
fn generate_pom_xml(main_class: &str, deps: &[MavenDep]) -> String {
    let spring_present = deps.iter().any(|d| d.group.starts_with("org.springframework"));

    let mut pom = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0"
         xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
         xsi:schemaLocation="http://maven.apache.org/POM/4.0.0
         http://maven.apache.org/xsd/maven-4.0.0.xsd">
    <modelVersion>4.0.0</modelVersion>

    <groupId>com.codeforge</groupId>
    <artifactId>generated-project</artifactId>
    <version>1.0-SNAPSHOT</version>
"#,
    );

    if spring_present {
        pom.push_str(
            r#"
    <parent>
        <groupId>org.springframework.boot</groupId>
        <artifactId>spring-boot-starter-parent</artifactId>
        <version>3.1.5</version>
        <relativePath/>
    </parent>
"#,
        );
    }

    pom.push_str(
        r#"
    <properties>
        <maven.compiler.source>11</maven.compiler.source>
        <maven.compiler.target>11</maven.compiler.target>
        <project.build.sourceEncoding>UTF-8</project.build.sourceEncoding>
    </properties>

    <dependencies>
"#,
    );

    for dep in deps {
        pom.push_str(&format!(
            "        <dependency>\n            <groupId>{}</groupId>\n            <artifactId>{}</artifactId>\n            <version>{}</version>\n        </dependency>\n",
            dep.group, dep.artifact, dep.version
        ));
    }

    pom.push_str("    </dependencies>\n\n    <build>\n        <plugins>\n");

    if spring_present {
        pom.push_str(
            "            <plugin>\n                <groupId>org.springframework.boot</groupId>\n                <artifactId>spring-boot-maven-plugin</artifactId>\n            </plugin>\n",
        );
    }

    pom.push_str(&format!(
        "            <plugin>\n                <groupId>org.apache.maven.plugins</groupId>\n                <artifactId>maven-compiler-plugin</artifactId>\n                <version>3.11.0</version>\n            </plugin>\n            <plugin>\n                <groupId>org.codehaus.mojo</groupId>\n                <artifactId>exec-maven-plugin</artifactId>\n                <version>3.1.0</version>\n                <configuration>\n                    <mainClass>{main_class}</mainClass>\n                </configuration>\n            </plugin>\n        </plugins>\n    </build>\n</project>\n"
    ));

    pom
}

/// Extracts `javac`-style `file.java:line: error: message` diagnostics plus actionable fixes for
/// a handful of recurring failure patterns. Mirrors `_parse_java_errors`.
fn parse_java_errors(output: &str) -> (Vec<String>, Vec<String>) {
    let mut errors: Vec<String> = JAVAC_ERROR
        .captures_iter(output)
        .map(|c| format!("{}:{} - {}", &c[1], &c[2], &c[3]))
        .collect();

    let mut fixes = Vec::new();
    if output.contains("cannot find symbol") {
        fixes.push("Missing import statement or undefined variable".to_string());
        fixes.push("Check if all classes and methods are properly imported".to_string());
    }
    if output.contains("class, interface, or enum expected") {
        fixes.push("Invalid class structure - ensure proper class declaration".to_string());
    }
    if output.contains("incompatible types") {
        fixes.push("Type mismatch - check variable types and method return types".to_string());
    }
    if output.contains("method does not override") {
        fixes.push("Remove @Override annotation or implement the correct method signature".to_string());
    }
    if output.contains("unreachable statement") {
        fixes.push("Remove code after return/throw statements".to_string());
    }
    if output.contains("variable might not have been initialized") {
        fixes.push("Initialize variables before use".to_string());
    }
    if output.contains("package does not exist") || output.contains("cannot find symbol") {
        fixes.push("Add required Maven dependencies to pom.xml".to_string());
        fixes.push("Ensure all external libraries are properly declared".to_string());
    }

    if errors.is_empty() {
        errors.push(output.chars().take(500).collect());
    }
    if fixes.is_empty() {
        fixes.push("Review Java syntax and structure".to_string());
        fixes.push("Check Maven dependencies".to_string());
    }

    (errors, fixes)
}

/// Structural stand-in for `ast.parse`: checks paired delimiters and quotes rather than parsing
/// Python grammar, since there is no Python parser in this ecosystem worth reaching for.
fn python_syntax_check(code: &str) -> Result<(), String> {
    if code.trim().is_empty() {
        return Err("empty source".to_string());
    }

    let mut stack = Vec::new();
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    for (line_no, line) in code.lines().enumerate() {
        for ch in line.chars() {
            if escaped {
                escaped = false;
                continue;
            }
            match ch {
                '\\' if in_single || in_double => escaped = true,
                '\'' if !in_double => in_single = !in_single,
                '"' if !in_single => in_double = !in_double,
                '(' | '[' | '{' if !in_single && !in_double => stack.push((ch, line_no + 1)),
                ')' | ']' | '}' if !in_single && !in_double => {
                    let expected = match ch {
                        ')' => '(',
                        ']' => '[',
                        _ => '{',
                    };
                    match stack.pop() {
                        Some((open, _)) if open == expected => {}
                        _ => return Err(format!("unbalanced '{ch}' at line {}", line_no + 1)),
                    }
                }
                _ => {}
            }
        }
        in_single = false;
        in_double = false;
    }

    if let Some((open, line_no)) = stack.pop() {
        return Err(format!("unclosed '{open}' opened at line {line_no}"));
    }

    Ok(())
}

fn filter_python_dependencies(dependencies: &[Dependency]) -> (Vec<String>, Vec<String>) {
    let mut kept = Vec::new();
    let mut removed = Vec::new();
    for dep in dependencies {
        let name = dep.canonical();
        let trimmed = name.trim();
        let lower = trimmed.to_lowercase();
        if trimmed.is_empty() || trimmed.starts_with('#') || PROJECT_INTERNALS.contains(&lower.as_str()) || STDLIB_MODULES.contains(&lower.as_str()) {
            removed.push(name);
        } else {
            kept.push(name);
        }
    }
    (kept, removed)
}

/// Validates and, for Java, compiles generated code (§4.5).
pub struct BuildAgent {
    settings: Settings,
}

impl BuildAgent {
    pub fn new(settings: Settings) -> Self {
        crate::info!("Build Agent initialized");
        Self { settings }
    }

    pub async fn analyze_and_build(&self, code: &str, language: ProgrammingLanguage, dependencies: &[Dependency]) -> BuildResult {
        crate::info!("analyzing {} code for build", language.as_str());
        match language {
            ProgrammingLanguage::Python => self.build_python(code, dependencies).await,
            ProgrammingLanguage::Java => self.build_java(code, dependencies).await,
        }
    }

    pub async fn build_project(
        &self,
        files: &[FileArtifact],
        language: ProgrammingLanguage,
        dependencies: &[Dependency],
    ) -> BuildResult {
        crate::info!("building multi-file {} project with {} file(s)", language.as_str(), files.len());
        match language {
            ProgrammingLanguage::Python => self.build_python_project(files, dependencies).await,
            ProgrammingLanguage::Java => self.build_java_project(files, dependencies).await,
        }
    }

    async fn install_python_packages(&self, packages: &[String]) -> Result<(), String> {
        if packages.is_empty() {
            return Ok(());
        }
        crate::info!("installing Python dependencies: {:?}", packages);

        let mut argv = vec!["python3".to_string(), "-m".to_string(), "pip".to_string(), "install".to_string()];
        argv.extend(packages.iter().cloned());

        let timeout = Duration::from_secs(self.settings.installer_timeout_seconds);
        let safe_dir = std::env::temp_dir();
        match ToolRunner::run(&argv, Some(&safe_dir), timeout, None).await {
            Ok(output) if output.is_success() => Ok(()),
            Ok(output) => Err(output.stderr),
            Err(err) => Err(err.to_string()),
        }
    }

    async fn build_python(&self, code: &str, dependencies: &[Dependency]) -> BuildResult {
        if let Err(issue) = python_syntax_check(code) {
            crate::error!("Python syntax validation failed: {}", issue);
            return BuildResult {
                status: "error".to_string(),
                dependencies: dependencies.iter().map(Dependency::canonical).collect(),
                errors: vec![format!("Syntax error: {issue}")],
                suggested_fixes: vec![format!("Fix syntax error: {issue}")],
                build_instructions: "Fix syntax errors before proceeding".to_string(),
            };
        }
        crate::info!("Python syntax validation passed");

        let (kept, removed) = filter_python_dependencies(dependencies);
        if !removed.is_empty() {
            crate::warn!("filtered out project-internal modules: {:?}", removed);
        }

        if let Err(stderr) = self.install_python_packages(&kept).await {
            return BuildResult {
                status: "error".to_string(),
                dependencies: dependencies.iter().map(Dependency::canonical).collect(),
                errors: vec![format!("Failed to install dependencies: {stderr}")],
                suggested_fixes: vec!["Check package names and network connectivity".to_string()],
                build_instructions: "Resolve dependency installation issues".to_string(),
            };
        }

        crate::info!("Python build completed successfully");
        BuildResult {
            status: "success".to_string(),
            dependencies: dependencies.iter().map(Dependency::canonical).collect(),
            build_instructions: "Code is ready for execution".to_string(),
            errors: vec![],
            suggested_fixes: vec![],
        }
    }

    async fn build_python_project(&self, files: &[FileArtifact], dependencies: &[Dependency]) -> BuildResult {
        let python_files: Vec<&FileArtifact> =
            files.iter().filter(|f| f.language == "python" && f.filename.ends_with(".py")).collect();
        crate::info!("validating {} Python file(s)", python_files.len());

        let mut errors = Vec::new();
        let mut suggested_fixes = Vec::new();
        for file in &python_files {
            if let Err(issue) = python_syntax_check(&file.code) {
                errors.push(format!("{} - {issue}", file.filename));
                suggested_fixes.push(format!("Fix syntax in {}", file.filename));
            }
        }
        if !errors.is_empty() {
            return BuildResult {
                status: "error".to_string(),
                dependencies: vec![],
                errors,
                suggested_fixes,
                build_instructions: "Fix syntax errors in all files".to_string(),
            };
        }

        let (kept, removed) = filter_python_dependencies(dependencies);
        if !removed.is_empty() {
            crate::warn!("filtered out project-internal modules: {:?}", removed);
        }
        if kept.is_empty() {
            return BuildResult {
                status: "success".to_string(),
                dependencies: vec![],
                build_instructions: "All files validated, no external dependencies needed".to_string(),
                errors: vec![],
                suggested_fixes: vec![],
            };
        }

        if let Err(stderr) = self.install_python_packages(&kept).await {
            return BuildResult {
                status: "error".to_string(),
                dependencies: dependencies.iter().map(Dependency::canonical).collect(),
                errors: vec![format!("Failed to install dependencies: {stderr}")],
                suggested_fixes: vec!["Check package names and versions".to_string()],
                build_instructions: "Resolve dependency issues".to_string(),
            };
        }

        crate::info!("Python project build completed successfully");
        BuildResult {
            status: "success".to_string(),
            dependencies: dependencies.iter().map(Dependency::canonical).collect(),
            build_instructions: "All files validated and dependencies installed".to_string(),
            errors: vec![],
            suggested_fixes: vec![],
        }
    }

    fn discover_maven(&self) -> Option<PathBuf> {
        let fallback_dirs: Vec<PathBuf> = (8..=11)
            .map(|minor| PathBuf::from(format!("C:/Program Files/apache-maven-3.9.{minor}/bin")))
            .collect();
        ToolRunner::discover("mvn", &fallback_dirs, None)
    }

    async fn build_java(&self, code: &str, dependencies: &[Dependency]) -> BuildResult {
        let package_name = PACKAGE_DECL.captures(code).map(|c| c[1].to_string());
        let class_name = match PUBLIC_CLASS.captures(code) {
            Some(c) => c[1].to_string(),
            None => {
                crate::error!("no public class found, code preview: {}", &code.chars().take(500).collect::<String>());
                return BuildResult {
                    status: "error".to_string(),
                    dependencies: vec![],
                    errors: vec![
                        "Could not find public class declaration".to_string(),
                        "The generated code may be incomplete or invalid Java".to_string(),
                    ],
                    suggested_fixes: vec![
                        "Ensure code has 'public class ClassName'".to_string(),
                        "Check that code is valid Java (not pseudocode or incomplete)".to_string(),
                        "For Spring Boot single-file: simplify the request or use multi-file generation".to_string(),
                    ],
                    build_instructions: String::new(),
                };
            }
        };

        let mut pom_deps: Vec<MavenDep> = Vec::new();
        for dep in dependencies {
            if let Some(maven) = dependency_to_maven(dep) {
                push_unique(&mut pom_deps, maven);
            }
        }
        for detected in detect_java_dependencies(code) {
            push_unique(&mut pom_deps, detected);
        }

        let lower = code.to_lowercase();
        let has_security = code.contains("Security") || lower.contains("security");
        let has_jwt = lower.contains("jwt") || code.contains("Jwt") || lower.contains("jsonwebtoken");
        enrich_spring_starters(&mut pom_deps, has_security, has_jwt, false);

        let temp_dir = match tempfile::Builder::new().prefix("codeforge-build-").tempdir() {
            Ok(dir) => dir,
            Err(err) => {
                return BuildResult {
                    status: "error".to_string(),
                    dependencies: vec![],
                    errors: vec![err.to_string()],
                    suggested_fixes: vec![],
                    build_instructions: String::new(),
                };
            }
        };

        let src_dir = match &package_name {
            Some(pkg) => temp_dir.path().join("src/main/java").join(pkg.replace('.', "/")),
            None => temp_dir.path().join("src/main/java"),
        };
        if let Err(err) = tokio::fs::create_dir_all(&src_dir).await {
            return BuildResult {
                status: "error".to_string(),
                dependencies: vec![],
                errors: vec![err.to_string()],
                suggested_fixes: vec![],
                build_instructions: String::new(),
            };
        }
        let _ = tokio::fs::write(src_dir.join(format!("{class_name}.java")), code).await;

        let pom = generate_pom_xml(&class_name, &pom_deps);
        let _ = tokio::fs::write(temp_dir.path().join("pom.xml"), pom).await;
        crate::info!("created Maven project in {}", temp_dir.path().display());

        let Some(mvn) = self.discover_maven() else {
            return BuildResult {
                status: "error".to_string(),
                dependencies: vec![],
                errors: vec!["Maven (mvn) not found in system PATH or common installation locations".to_string()],
                suggested_fixes: vec![
                    "Install Maven and add its bin directory to PATH".to_string(),
                    "Or add a Maven wrapper (mvnw) to the project".to_string(),
                ],
                build_instructions: String::new(),
            };
        };

        let result_deps: Vec<String> = pom_deps.iter().map(MavenDep::coord).collect();
        let compile = ToolRunner::run(
            &[mvn.display().to_string(), "clean".to_string(), "compile".to_string()],
            Some(temp_dir.path()),
            Duration::from_secs(self.settings.build_timeout_seconds),
            None,
        )
        .await;

        let build_result = match compile {
            Ok(output) if output.is_success() => {
                crate::info!("Java build completed successfully");
                BuildResult {
                    status: "success".to_string(),
                    dependencies: result_deps,
                    build_instructions: format!("Java class {class_name} compiled successfully"),
                    errors: vec![],
                    suggested_fixes: vec![],
                }
            }
            Ok(output) => {
                let combined = format!("{}\n{}", output.stderr, output.stdout);
                let (mut errors, fixes) = parse_java_errors(&combined);
                errors.extend(output.stdout.lines().filter(|l| l.contains("[ERROR]")).take(5).map(str::to_string));
                crate::error!("Maven compilation failed");
                BuildResult {
                    status: "error".to_string(),
                    dependencies: result_deps,
                    errors,
                    suggested_fixes: fixes,
                    build_instructions: "Fix compilation errors".to_string(),
                }
            }
            Err(err) => BuildResult {
                status: "error".to_string(),
                dependencies: result_deps,
                errors: vec![err.to_string()],
                suggested_fixes: vec!["Simplify dependencies or review the Maven toolchain".to_string()],
                build_instructions: String::new(),
            },
        };

        build_result
    }

    async fn build_java_project(&self, files: &[FileArtifact], dependencies: &[Dependency]) -> BuildResult {
        let java_files: Vec<&FileArtifact> = files.iter().filter(|f| f.filename.ends_with(".java")).collect();
        if java_files.is_empty() {
            return BuildResult {
                status: "error".to_string(),
                dependencies: vec![],
                errors: vec!["No Java files found in project".to_string()],
                suggested_fixes: vec!["Add Java source files".to_string()],
                build_instructions: String::new(),
            };
        }

        let main_class = java_files
            .iter()
            .find(|f| f.code.contains("public static void main"))
            .and_then(|f| PUBLIC_CLASS.captures(&f.code))
            .map(|c| c[1].to_string());

        let temp_dir = match tempfile::Builder::new().prefix("codeforge-build-").tempdir() {
            Ok(dir) => dir,
            Err(err) => {
                return BuildResult {
                    status: "error".to_string(),
                    dependencies: vec![],
                    errors: vec![err.to_string()],
                    suggested_fixes: vec![],
                    build_instructions: String::new(),
                };
            }
        };

        for file in &java_files {
            let is_test_file = file.filename.contains("Test") || file.filename.contains("/test/");
            let base_dir = if is_test_file { "src/test/java" } else { "src/main/java" };

            let package = PACKAGE_DECL.captures(&file.code).map(|c| c[1].to_string());
            let file_dir = match &package {
                Some(pkg) => temp_dir.path().join(base_dir).join(pkg.replace('.', "/")),
                None => temp_dir.path().join(base_dir),
            };
            if tokio::fs::create_dir_all(&file_dir).await.is_err() {
                continue;
            }

            let filename = if !file.filename.starts_with("file_") {
                let leaf = file.filename.rsplit('/').next().unwrap_or(&file.filename);
                if leaf.ends_with(".java") { leaf.to_string() } else { format!("{leaf}.java") }
            } else {
                let type_name = PUBLIC_TYPE.captures(&file.code).map(|c| c[1].to_string()).unwrap_or_else(|| "Main".to_string());
                format!("{type_name}.java")
            };

            let _ = tokio::fs::write(file_dir.join(&filename), &file.code).await;
            crate::info!("created {} ({})", filename, if is_test_file { "test" } else { "main" });
        }

        let mut pom_deps: Vec<MavenDep> = Vec::new();
        for dep in dependencies {
            if let Some(maven) = dependency_to_maven(dep) {
                push_unique(&mut pom_deps, maven);
            }
        }
        for file in &java_files {
            for detected in detect_java_dependencies(&file.code) {
                push_unique(&mut pom_deps, detected);
            }
        }

        let has_tests = java_files.iter().any(|f| f.filename.contains("Test"));
        let has_security = java_files.iter().any(|f| f.filename.to_lowercase().contains("security") || f.code.contains("Security"));
        let has_jwt = java_files
            .iter()
            .any(|f| f.filename.to_lowercase().contains("jwt") || f.code.contains("Jwt") || f.code.to_lowercase().contains("jsonwebtoken"));
        enrich_spring_starters(&mut pom_deps, has_security, has_jwt, has_tests);

        let pom_main_class = main_class.clone().unwrap_or_else(|| "com.codeforge.Main".to_string());
        let pom = generate_pom_xml(&pom_main_class, &pom_deps);
        let _ = tokio::fs::write(temp_dir.path().join("pom.xml"), pom).await;
        crate::info!("created pom.xml");

        let result_deps: Vec<String> = pom_deps.iter().map(MavenDep::coord).collect();

        let Some(mvn) = self.discover_maven() else {
            return BuildResult {
                status: "error".to_string(),
                dependencies: result_deps,
                errors: vec!["Maven not found in system PATH".to_string()],
                suggested_fixes: vec!["Install Maven and add to PATH".to_string(), "Or use Maven wrapper (mvnw)".to_string()],
                build_instructions: String::new(),
            };
        };

        let compile = ToolRunner::run(
            &[mvn.display().to_string(), "clean".to_string(), "compile".to_string()],
            Some(temp_dir.path()),
            Duration::from_secs(self.settings.build_timeout_seconds),
            None,
        )
        .await;

        match compile {
            Ok(output) if output.is_success() => {
                crate::info!("Java project compiled successfully");
                BuildResult {
                    status: "success".to_string(),
                    dependencies: result_deps,
                    build_instructions: "Project compiled successfully".to_string(),
                    errors: vec![],
                    suggested_fixes: vec![],
                }
            }
            Ok(output) => {
                let combined = format!("{}\n{}", output.stderr, output.stdout);
                let (mut errors, fixes) = parse_java_errors(&combined);
                errors.extend(output.stdout.lines().filter(|l| l.contains("[ERROR]")).take(10).map(|l| l.trim().to_string()));
                crate::error!("Maven compilation failed");
                BuildResult {
                    status: "error".to_string(),
                    dependencies: result_deps,
                    errors,
                    suggested_fixes: fixes,
                    build_instructions: "Fix compilation errors".to_string(),
                }
            }
            Err(err) => BuildResult {
                status: "error".to_string(),
                dependencies: result_deps,
                errors: vec![err.to_string()],
                suggested_fixes: vec!["Review project structure and dependencies".to_string()],
                build_instructions: String::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_syntax_check_flags_unbalanced_brackets() {
        assert!(python_syntax_check("def f():\n    return [1, 2\n").is_err());
        assert!(python_syntax_check("def f():\n    return [1, 2]\n").is_ok());
    }

    #[test]
    fn python_syntax_check_ignores_brackets_inside_strings() {
        assert!(python_syntax_check("s = '(['\nprint(s)\n").is_ok());
    }

    #[test]
    fn filters_stdlib_and_project_internal_dependencies() {
        let deps = vec![Dependency::simple("os"), Dependency::simple("utils"), Dependency::simple("requests")];
        let (kept, removed) = filter_python_dependencies(&deps);
        assert_eq!(kept, vec!["requests".to_string()]);
        assert_eq!(removed.len(), 2);
    }

    #[test]
    fn detects_gson_import_as_maven_dependency() {
        let code = "import java.util.List;\nimport com.google.gson.Gson;\n";
        let deps = detect_java_dependencies(code);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].coord(), "com.google.code.gson:gson:2.10.1");
    }

    #[test]
    fn spring_enrichment_adds_security_and_jwt_starters_conditionally() {
        let mut deps = vec![MavenDep { group: "org.springframework.boot".to_string(), artifact: "spring-boot-starter-web".to_string(), version: "3.1.5".to_string() }];
        enrich_spring_starters(&mut deps, true, true, false);
        assert!(deps.iter().any(|d| d.artifact == "spring-boot-starter-security"));
        assert!(deps.iter().any(|d| d.artifact == "jjwt-api"));
        assert!(!deps.iter().any(|d| d.artifact == "spring-boot-starter-test"));
    }

    #[test]
    fn generate_pom_xml_includes_exec_plugin_and_java_11() {
        let pom = generate_pom_xml("com.codeforge.Main", &[]);
        assert!(pom.contains("<mainClass>com.codeforge.Main</mainClass>"));
        assert!(pom.contains("<maven.compiler.source>11</maven.compiler.source>"));
        assert!(pom.contains("exec-maven-plugin"));
    }

    #[test]
    fn parse_java_errors_extracts_file_line_and_suggests_fixes() {
        let output = "Main.java:10: error: cannot find symbol\n  symbol: class Foo\n";
        let (errors, fixes) = parse_java_errors(output);
        assert_eq!(errors[0], "Main.java:10 - cannot find symbol");
        assert!(fixes.iter().any(|f| f.contains("import")));
    }
}
