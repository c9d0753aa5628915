//! Session snapshot persistence.
//!
//! A session suspended on a clarification outlives the process that started
//! it: the snapshot is written to disk and reloaded by the next invocation.
//! One snapshot file per state directory; starting a new session overwrites
//! the old one.

use librarian_core::error::{Error, SessionError};
use librarian_core::{Document, SpecialistResult, Task};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::budget::ContextBudgetTracker;
use crate::session::{PendingClarification, SessionState};

const SNAPSHOT_FILE: &str = "session.json";

/// Everything needed to resume a session in a later process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub state: SessionState,
    pub request: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub document: Option<Document>,
    pub tasks: Vec<Task>,
    pub results: Vec<SpecialistResult>,
    pub budget: ContextBudgetTracker,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<PendingClarification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiled_output: Option<String>,
    pub saved_at: DateTime<Utc>,
}

/// JSON-file-backed snapshot storage under a state directory.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            path: state_dir.as_ref().join(SNAPSHOT_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Persist a snapshot, creating the state directory if needed.
    pub fn save(&self, snapshot: &SessionSnapshot) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Internal(format!("failed to create state directory: {e}")))?;
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, json)
            .map_err(|e| Error::Internal(format!("failed to write session snapshot: {e}")))?;
        debug!(path = %self.path.display(), session = %snapshot.id, "Session snapshot saved");
        Ok(())
    }

    /// Load the stored snapshot.
    pub fn load(&self) -> Result<SessionSnapshot, Error> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SessionError::SnapshotMissing(self.path.display().to_string()).into());
            }
            Err(e) => {
                return Err(SessionError::SnapshotCorrupt(e.to_string()).into());
            }
        };
        let snapshot: SessionSnapshot = serde_json::from_str(&json)
            .map_err(|e| SessionError::SnapshotCorrupt(e.to_string()))?;
        debug!(path = %self.path.display(), session = %snapshot.id, "Session snapshot loaded");
        Ok(snapshot)
    }

    /// Remove the stored snapshot. Absence is not an error.
    pub fn clear(&self) -> Result<(), Error> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Internal(format!(
                "failed to remove session snapshot: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{OrchestratorConfig, ProcessingSession};
    use librarian_core::SpecialistCategory;

    fn sample_snapshot() -> SessionSnapshot {
        SessionSnapshot {
            id: "session-1".into(),
            state: SessionState::AwaitingClarification,
            request: "tabulate the appendix".into(),
            context: None,
            document: Some(Document::from_text("appendix content")),
            tasks: vec![Task::new("Tabulate", SpecialistCategory::TableGeneration)],
            results: vec![SpecialistResult::NeedsClarification {
                question: "Which columns?".into(),
            }],
            budget: ContextBudgetTracker::new(200_000, 8_000),
            pending: Some(PendingClarification {
                task_index: 0,
                question: "Which columns?".into(),
            }),
            compiled_output: None,
            saved_at: Utc::now(),
        }
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());

        store.save(&sample_snapshot()).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.id, "session-1");
        assert_eq!(loaded.state, SessionState::AwaitingClarification);
        assert_eq!(loaded.pending.unwrap().question, "Which columns?");
        assert_eq!(loaded.results.len(), 1);
    }

    #[test]
    fn load_missing_snapshot_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("No session snapshot"));
    }

    #[test]
    fn load_corrupt_snapshot_reports_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        fs::write(store.path(), "{ not json").unwrap();
        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("could not be read"));
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        store.clear().unwrap();

        store.save(&sample_snapshot()).unwrap();
        assert!(store.exists());
        store.clear().unwrap();
        assert!(!store.exists());
        store.clear().unwrap();
    }

    #[test]
    fn save_creates_nested_state_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("deep").join("state"));
        store.save(&sample_snapshot()).unwrap();
        assert!(store.exists());
    }

    #[test]
    fn session_round_trips_through_snapshot() {
        let config = OrchestratorConfig {
            model: "test-model".into(),
            max_output_tokens: 8000,
            context_window_tokens: 200_000,
        };
        let session = ProcessingSession::from_snapshot(config, sample_snapshot());
        assert_eq!(session.id(), "session-1");
        assert_eq!(session.state(), SessionState::AwaitingClarification);

        let back = session.snapshot();
        assert_eq!(back.tasks.len(), 1);
        assert_eq!(back.pending.unwrap().task_index, 0);
    }
}
