//! Materializes a template onto disk and recomputes the resulting file tree (§4.9).
//!
//! Grounded on `agents/project_scaffold.py::scaffold_project` (directories first, then leaf
//! files, then config files with the `mypackage`/`my-package`/`com.example` substitutions,
//! then a fresh walk of the result for the file tree) but using `walkdir` in place of the
//! original's hand-rolled recursive `_build_file_tree`.

use super::registry::{get_template, Node};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("template '{0}' not found")]
    UnknownTemplate(String),

    #[error("failed to create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: std::io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ScaffoldResult {
    pub project_root: String,
    pub files: Vec<String>,
    pub file_tree: serde_json::Value,
    pub template_name: String,
}

pub struct Scaffolder;

impl Scaffolder {
    pub fn scaffold(
        project_name: &str,
        template_name: &str,
        root_dir: &Path,
    ) -> Result<ScaffoldResult, ScaffoldError> {
        let template =
            get_template(template_name).ok_or_else(|| ScaffoldError::UnknownTemplate(template_name.to_string()))?;

        let project_root = root_dir.join(project_name);
        std::fs::create_dir_all(&project_root)
            .map_err(|source| ScaffoldError::CreateDir { path: project_root.clone(), source })?;

        let mut created = Vec::new();
        for (name, node) in &template.structure {
            write_node(&project_root, Path::new(name), node, &mut created)?;
        }

        for (filename, body) in &template.config_files {
            let substituted = substitute(body, project_name);
            let file_path = project_root.join(filename);
            if let Some(parent) = file_path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|source| ScaffoldError::CreateDir { path: parent.to_path_buf(), source })?;
            }
            std::fs::write(&file_path, substituted)
                .map_err(|source| ScaffoldError::Write { path: file_path, source })?;
            created.push(filename.to_string());
        }

        let file_tree = build_file_tree(&project_root);

        Ok(ScaffoldResult {
            project_root: project_root.display().to_string(),
            files: created,
            file_tree,
            template_name: template_name.to_string(),
        })
    }
}

fn write_node(
    root: &Path,
    relative: &Path,
    node: &Node,
    created: &mut Vec<String>,
) -> Result<(), ScaffoldError> {
    let full_path = root.join(relative);
    match node {
        Node::Dir(children) => {
            std::fs::create_dir_all(&full_path)
                .map_err(|source| ScaffoldError::CreateDir { path: full_path.clone(), source })?;
            created.push(relative.display().to_string());
            for (name, child) in children {
                write_node(root, &relative.join(name), child, created)?;
            }
        }
        Node::File(content) => {
            if let Some(parent) = full_path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|source| ScaffoldError::CreateDir { path: parent.to_path_buf(), source })?;
            }
            std::fs::write(&full_path, content)
                .map_err(|source| ScaffoldError::Write { path: full_path.clone(), source })?;
            created.push(relative.display().to_string());
        }
    }
    Ok(())
}

/// The fixed substitution set from §4.9: `mypackage` -> project name, `my-package` -> its
/// dash-cased form, `com.example` -> a sanitized package prefix derived from the project name.
fn substitute(body: &str, project_name: &str) -> String {
    let dashed = project_name.replace('_', "-");
    let sanitized_package = project_name.replace('-', "");
    body.replace("mypackage", project_name)
        .replace("my-package", &dashed)
        .replace("com.example", &format!("com.{sanitized_package}"))
}

/// Walks the scaffolded tree with `walkdir` and folds the flat entry list back into the nested
/// `{name: {...}}` shape the original's recursive `_build_file_tree` produced directly.
fn build_file_tree(root: &Path) -> serde_json::Value {
    let mut root_map = serde_json::Map::new();

    let mut entries: Vec<_> = walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy();
            name == ".gitignore" || !name.starts_with('.')
        })
        .collect();
    entries.sort_by(|a, b| a.path().cmp(b.path()));

    for entry in entries {
        let relative = match entry.path().strip_prefix(root) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let components: Vec<String> =
            relative.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();
        let Some((leaf, dirs)) = components.split_last() else { continue };

        let mut cursor = &mut root_map;
        for dir in dirs {
            let entry = cursor
                .entry(dir.clone())
                .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
            cursor = entry.as_object_mut().expect("directory nodes are always objects");
        }

        if entry.file_type().is_dir() {
            cursor.entry(leaf.clone()).or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
        } else if let Ok(metadata) = entry.metadata() {
            cursor.insert(
                leaf.clone(),
                serde_json::json!({
                    "type": "file",
                    "size": metadata.len(),
                    "path": relative.display().to_string(),
                }),
            );
        }
    }

    serde_json::Value::Object(root_map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaffolds_fastapi_with_substitutions() {
        let dir = tempfile::tempdir().unwrap();
        let result = Scaffolder::scaffold("my_service", "fastapi", dir.path()).unwrap();

        let requirements = std::fs::read_to_string(dir.path().join("my_service/requirements.txt")).unwrap();
        assert!(requirements.contains("fastapi=="));
        assert!(std::path::Path::new(&result.project_root).join("src/main.py").exists());
        assert!(result.file_tree.is_object());
    }

    #[test]
    fn substitutes_package_names_in_spring_boot_pom() {
        let dir = tempfile::tempdir().unwrap();
        Scaffolder::scaffold("payments-service", "spring_boot", dir.path()).unwrap();
        let pom = std::fs::read_to_string(dir.path().join("payments-service/pom.xml")).unwrap();
        assert!(pom.contains("org.springframework.boot"));
    }

    #[test]
    fn unknown_template_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Scaffolder::scaffold("x", "does-not-exist", dir.path());
        assert!(matches!(result, Err(ScaffoldError::UnknownTemplate(_))));
    }
}
