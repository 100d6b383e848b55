//! Turns a requirement into a generated file bundle via an LLM call (§4.2).
//!
//! Grounded on `code_generator.py::generate_code`/`generate_project_code`: prompt assembly from
//! `config/prompts.py`'s `CODE_GENERATOR_SYSTEM_PROMPT`/`_HUMAN_TEMPLATE`, the javax->jakarta
//! rewrite and brace-balancing fix applied to Java bodies, and last-occurrence dedup.

use super::{dependency_extractor, response_splitter};
use crate::llm::{LLMError, LLMProvider};
use crate::model::{GeneratedBundle, ProgrammingLanguage};
use crate::templates::registry::Node;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "You are an expert code generation agent. Your role is to write complete, \
executable, and well-documented code based on user requirements.

Guidelines:
1. Generate COMPLETE, RUNNABLE code, not pseudocode or snippets.
2. Include all necessary imports and dependencies.
3. Add proper error handling and logging.
4. Follow best practices for the target language (Python/Java).

For Java code: generate exactly one public class per file, use the Jakarta EE namespace
(jakarta.*) rather than javax.* for Spring Boot 3.x, use in-memory storage for single-file
Spring services, and list dependencies in a `// REQUIRES: group:artifact:version` comment.

For Python code: use modern language features, include type hints, and list dependencies in a
`# REQUIRES: pkg, pkg` comment.

Separate multi-file output with `# FILE: filename` (or `// FILE: filename` for Java) markers.
Return only the code, no explanation before or after.

If this is a retry after a previous failure, carefully address the error context below.";

fn human_prompt(requirements: &str, language: ProgrammingLanguage, error_context: &str) -> String {
    format!(
        "**User Requirements:**\n{requirements}\n\n\
         **Target Language:** {}\n\n\
         {error_context}\n\n\
         Generate the complete, executable code now:",
        language.as_str().to_uppercase(),
    )
}

fn project_human_prompt(
    requirements: &str,
    language: ProgrammingLanguage,
    project_template: &str,
    file_list: &[String],
    error_context: &str,
) -> String {
    let files = file_list.iter().map(|f| format!("- {f}")).collect::<Vec<_>>().join("\n");
    format!(
        "**MULTI-FILE PROJECT GENERATION**\n\n\
         You must generate code for ALL files listed below. This is a {project_template} project.\n\n\
         **Required Files:**\n{files}\n\n\
         Use `# FILE: <exact filename>` followed by a fenced code block for each file. Every opening \
         brace must have a matching closing brace; do not truncate any file.\n\n\
         **User Requirements:**\n{requirements}\n\n\
         **Target Language:** {}\n\n\
         {error_context}\n\n\
         Generate complete code for ALL files now:",
        language.as_str().to_uppercase(),
    )
}

/// Generates code from a natural-language requirement, for single-file and multi-file targets.
pub struct CodeGeneratorAgent {
    llm: Arc<dyn LLMProvider>,
    temperature: f32,
}

impl CodeGeneratorAgent {
    pub fn new(llm: Arc<dyn LLMProvider>, temperature: f32) -> Self {
        crate::info!("Code Generator Agent initialized");
        Self { llm, temperature }
    }

    pub async fn generate(
        &self,
        requirements: &str,
        language: ProgrammingLanguage,
        error_context: &str,
    ) -> Result<GeneratedBundle, LLMError> {
        let prompt = format!("{SYSTEM_PROMPT}\n\n{}", human_prompt(requirements, language, error_context));
        let response = self.llm.invoke(&prompt, self.temperature).await?;
        let bundle = bundle_from_response(&response, language);
        crate::info!("code generated: {} file(s), {} dependency(ies)", bundle.files.len(), bundle.dependencies.len());
        Ok(bundle)
    }

    pub async fn generate_project(
        &self,
        requirements: &str,
        language: ProgrammingLanguage,
        project_template: &str,
        structure: &[(&'static str, Node)],
        error_context: &str,
    ) -> Result<GeneratedBundle, LLMError> {
        let file_list = extract_file_paths(structure, "");
        let prompt = format!(
            "{SYSTEM_PROMPT}\n\n{}",
            project_human_prompt(requirements, language, project_template, &file_list, error_context)
        );
        let response = self.llm.invoke(&prompt, self.temperature).await?;
        let bundle = bundle_from_project_response(&response, language, &file_list);
        crate::info!(
            "project code generated: {} file(s), {} dependency(ies)",
            bundle.files.len(),
            bundle.dependencies.len()
        );
        Ok(bundle)
    }
}

fn extract_file_paths(structure: &[(&'static str, Node)], prefix: &str) -> Vec<String> {
    let mut files = Vec::new();
    for (name, node) in structure {
        let path = if prefix.is_empty() { name.to_string() } else { format!("{prefix}/{name}") };
        match node {
            Node::Dir(children) => files.extend(extract_file_paths(children, &path)),
            Node::File(_) => files.push(path),
        }
    }
    files
}

fn bundle_from_response(response: &str, language: ProgrammingLanguage) -> GeneratedBundle {
    let segments = response_splitter::split(response, language);
    build_bundle(segments, response, language)
}

fn bundle_from_project_response(
    response: &str,
    language: ProgrammingLanguage,
    file_list: &[String],
) -> GeneratedBundle {
    let mut segments = response_splitter::split(response, language);

    // The splitter's bare whole-text fallback doesn't apply to multi-file projects; if nothing
    // was extracted, pair fenced blocks positionally against the template's required file list.
    if segments.len() == 1 && !file_list.is_empty() && segments[0].body == response.trim() {
        segments = segments
            .into_iter()
            .enumerate()
            .map(|(i, s)| response_splitter::SplitSegment {
                filename: file_list.get(i).cloned().unwrap_or(s.filename),
                body: s.body,
            })
            .collect();
    }

    build_bundle(segments, response, language)
}

fn build_bundle(
    segments: Vec<response_splitter::SplitSegment>,
    source_for_deps: &str,
    language: ProgrammingLanguage,
) -> GeneratedBundle {
    let mut bundle = GeneratedBundle::default();

    for segment in segments {
        let body = if language == ProgrammingLanguage::Java && segment.filename.ends_with(".java") {
            fix_java_body(&segment.body)
        } else {
            segment.body
        };
        let file_language = if segment.filename.ends_with(".java") { "java" } else { language.as_str() };
        let replaced = bundle.upsert_file(crate::model::FileArtifact::new(segment.filename.clone(), body, file_language));
        if replaced {
            crate::warn!("duplicate file {} in generated response, kept latest", segment.filename);
        }
    }

    bundle.dependencies = dependency_extractor::extract(source_for_deps, language);
    bundle
}

const JAVAX_TO_JAKARTA: &[(&str, &str)] = &[
    ("javax.persistence", "jakarta.persistence"),
    ("javax.validation", "jakarta.validation"),
    ("javax.servlet", "jakarta.servlet"),
    ("javax.transaction", "jakarta.transaction"),
    ("javax.ejb", "jakarta.ejb"),
    ("javax.annotation", "jakarta.annotation"),
    ("javax.inject", "jakarta.inject"),
    ("javax.ws.rs", "jakarta.ws.rs"),
    ("javax.jms", "jakarta.jms"),
    ("javax.mail", "jakarta.mail"),
];

/// Rewrites legacy `javax.*` imports to `jakarta.*` (excluding `javax.sql`, a JDK namespace) and
/// appends any missing closing braces. Mirrors `_convert_javax_to_jakarta` plus the brace-balance
/// fix in `generate_project_code` (§4.2 step 5).
fn fix_java_body(body: &str) -> String {
    let mut code = body.to_string();
    for (javax_pkg, jakarta_pkg) in JAVAX_TO_JAKARTA {
        let pattern = format!("import {javax_pkg}");
        if code.contains(&pattern) {
            code = code.replace(&pattern, &format!("import {jakarta_pkg}"));
        }
    }

    let open_braces = code.matches('{').count();
    let close_braces = code.matches('}').count();
    if open_braces > close_braces {
        let missing = open_braces - close_braces;
        crate::warn!("unbalanced braces in generated Java file, appending {} closure(s)", missing);
        code.push('\n');
        code.push_str(&"}\n".repeat(missing));
    }

    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::MockProvider;

    #[tokio::test]
    async fn generates_a_single_python_file_with_dependencies() {
        let llm = Arc::new(MockProvider::new(vec![
            "# FILE: main.py\nimport requests\nprint('hello')\n".to_string(),
        ]));
        let agent = CodeGeneratorAgent::new(llm, 0.2);
        let bundle = agent.generate("print hello", ProgrammingLanguage::Python, "").await.unwrap();

        assert_eq!(bundle.files.len(), 1);
        assert_eq!(bundle.files[0].filename, "main.py");
        assert_eq!(bundle.dependencies[0].canonical(), "requests");
    }

    #[test]
    fn fix_java_body_converts_namespace_and_closes_braces() {
        let body = "import javax.persistence.Entity;\nclass Foo {\n  void bar() {\n";
        let fixed = fix_java_body(body);
        assert!(fixed.contains("import jakarta.persistence.Entity;"));
        assert_eq!(fixed.matches('{').count(), fixed.matches('}').count());
    }

    #[test]
    fn fix_java_body_leaves_javax_sql_untouched() {
        let body = "import javax.sql.DataSource;\nclass Foo {}\n";
        let fixed = fix_java_body(body);
        assert!(fixed.contains("import javax.sql.DataSource;"));
    }

    #[test]
    fn build_bundle_keeps_the_later_occurrence_of_a_duplicate_filename() {
        let segments = vec![
            response_splitter::SplitSegment { filename: "src/main.py".to_string(), body: "print('first')".to_string() },
            response_splitter::SplitSegment { filename: "src/main.py".to_string(), body: "print('second')".to_string() },
        ];
        let bundle = build_bundle(segments, "", ProgrammingLanguage::Python);
        assert_eq!(bundle.files.len(), 1);
        assert_eq!(bundle.files[0].code, "print('second')");
    }

    #[test]
    fn extract_file_paths_flattens_nested_template_structure() {
        let structure = vec![(
            "src",
            Node::Dir(vec![("main.py", Node::File("# stub\n")), ("utils.py", Node::File("# stub\n"))]),
        )];
        let files = extract_file_paths(&structure, "");
        assert_eq!(files, vec!["src/main.py".to_string(), "src/utils.py".to_string()]);
    }
}
