//! Save/load/list for `Session` and `ProjectSession` records under the configured persistence
//! directory, with the load-time `error_kind` migration rule from §6.
//!
//! Grounded on the original's `orchestrator.py::_save_session`/`load_session`/`list_sessions`:
//! one `metadata.json` per session directory, partitioned by session id, best-effort listing
//! that skips unreadable entries rather than failing the whole scan.

use crate::model::{ProjectSession, Session, SessionSummary};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to create session directory {path}: {source}")]
    CreateDir { path: PathBuf, source: std::io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },

    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to serialize session: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("session {0} not found")]
    NotFound(String),
}

/// Reads and writes session metadata under a single root directory.
pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn session_dir(&self, session_id: &str) -> PathBuf {
        self.root.join(session_id)
    }

    fn metadata_path(&self, session_id: &str) -> PathBuf {
        self.session_dir(session_id).join("metadata.json")
    }

    pub async fn save_session(&self, session: &Session) -> Result<(), SessionError> {
        self.save_value(&session.session_id, session).await
    }

    pub async fn save_project_session(&self, session: &ProjectSession) -> Result<(), SessionError> {
        self.save_value(&session.base.session_id, session).await
    }

    async fn save_value(&self, session_id: &str, value: &impl serde::Serialize) -> Result<(), SessionError> {
        let dir = self.session_dir(session_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| SessionError::CreateDir { path: dir.clone(), source })?;

        let path = self.metadata_path(session_id);
        let contents = serde_json::to_string_pretty(value)?;
        tokio::fs::write(&path, contents)
            .await
            .map_err(|source| SessionError::Write { path, source })
    }

    pub async fn load_session(&self, session_id: &str) -> Result<Session, SessionError> {
        let mut value = self.read_metadata_value(session_id).await?;
        migrate_error_kinds(&mut value);
        Ok(serde_json::from_value(value)?)
    }

    pub async fn load_project_session(&self, session_id: &str) -> Result<ProjectSession, SessionError> {
        let mut value = self.read_metadata_value(session_id).await?;
        migrate_error_kinds(&mut value);
        Ok(serde_json::from_value(value)?)
    }

    async fn read_metadata_value(&self, session_id: &str) -> Result<serde_json::Value, SessionError> {
        let path = self.metadata_path(session_id);
        if !path.exists() {
            return Err(SessionError::NotFound(session_id.to_string()));
        }
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| SessionError::Read { path, source })?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Best-effort directory scan: unreadable or malformed session directories are skipped
    /// rather than failing the whole listing, mirroring the original's tolerant `list_sessions`.
    pub async fn list_sessions(&self) -> Vec<SessionSummary> {
        let mut summaries = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(_) => return summaries,
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let Ok(file_type) = entry.file_type().await else { continue };
            if !file_type.is_dir() {
                continue;
            }
            let Some(session_id) = entry.file_name().to_str().map(str::to_string) else { continue };
            if let Ok(session) = self.load_session(&session_id).await {
                summaries.push(summarize(&session));
            }
        }

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        summaries
    }
}

fn summarize(session: &Session) -> SessionSummary {
    let preview: String = session.requirements.chars().take(80).collect();
    SessionSummary {
        session_id: session.session_id.clone(),
        requirements_preview: preview,
        language: session.language,
        success: session.success,
        updated_at: session.updated_at,
    }
}

/// Rewrite any `error_kind` string not in the current taxonomy to `"logic"`, in place, before
/// the value is handed to serde. Implements the load-time migration rule from §6.
fn migrate_error_kinds(value: &mut serde_json::Value) {
    const KNOWN: &[&str] = &["syntax", "build", "runtime", "logic", "missing_credentials"];

    if let Some(iterations) = value.get_mut("iterations").and_then(|v| v.as_array_mut()) {
        for iteration in iterations {
            if let Some(kind) = iteration.get_mut("error_kind") {
                if let Some(raw) = kind.as_str() {
                    if !KNOWN.contains(&raw) {
                        *kind = serde_json::Value::String("logic".to_string());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProgrammingLanguage;

    #[tokio::test]
    async fn round_trips_a_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        let session = Session::new("print hello", ProgrammingLanguage::Python, 3);
        let id = session.session_id.clone();

        store.save_session(&session).await.unwrap();
        let loaded = store.load_session(&id).await.unwrap();
        assert_eq!(loaded.session_id, id);
        assert_eq!(loaded.requirements, "print hello");
    }

    #[tokio::test]
    async fn missing_session_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        let result = store.load_session("does-not-exist").await;
        assert!(matches!(result, Err(SessionError::NotFound(_))));
    }

    #[test]
    fn migrates_unknown_error_kind_to_logic() {
        let mut value = serde_json::json!({
            "iterations": [
                { "error_kind": "some_future_kind" },
                { "error_kind": "syntax" },
            ]
        });
        migrate_error_kinds(&mut value);
        assert_eq!(value["iterations"][0]["error_kind"], "logic");
        assert_eq!(value["iterations"][1]["error_kind"], "syntax");
    }

    #[tokio::test]
    async fn list_sessions_orders_most_recently_updated_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());

        let mut older = Session::new("first", ProgrammingLanguage::Python, 3);
        older.updated_at = chrono::Utc::now() - chrono::Duration::hours(1);
        let mut newer = Session::new("second", ProgrammingLanguage::Java, 3);
        newer.updated_at = chrono::Utc::now();

        store.save_session(&older).await.unwrap();
        store.save_session(&newer).await.unwrap();

        let summaries = store.list_sessions().await;
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].session_id, newer.session_id);
    }
}
