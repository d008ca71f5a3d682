use log::{info, warn};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::config::Settings;
use crate::downloader::{Artifact, to_xlsx};
use crate::error::{NodeStatusError, Result};
use crate::loader::{check_extension, decode_rows, read_upload};
use crate::pipeline::process_rows;
use crate::record::NormalizedRecord;
use crate::snapshot::render_snapshot;

/// Everything the presentation layer shows for one session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    pub records: Option<Vec<NormalizedRecord>>,
    pub error: Option<String>,
    pub snapshot: Option<Artifact>,
    pub is_loading: bool,
}

/// One user session: the current state value plus the settings it runs
/// with.
///
/// At most one upload or snapshot runs at a time; a second request while
/// one is in flight is rejected with [`NodeStatusError::Busy`]. The lock is
/// never held across an await point.
pub struct Session {
    settings: Settings,
    state: Mutex<SessionState>,
}

impl Session {
    /// Fresh session with nothing loaded.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        lock_state(&self.state)
    }

    /// Copy of the current state.
    pub fn state(&self) -> SessionState {
        self.lock().clone()
    }

    /// Mark the session busy and clear the previous message.
    ///
    /// The busy flag is cleared when the returned guard drops, so a run
    /// whose future is dropped mid-await does not leave the session stuck.
    fn begin(&self) -> Result<LoadingGuard<'_>> {
        let mut state = self.lock();
        if state.is_loading {
            return Err(NodeStatusError::Busy);
        }
        state.is_loading = true;
        state.error = None;
        Ok(LoadingGuard { state: &self.state })
    }

    /// Record the outcome of a run, then leave the busy state.
    fn finish<T>(
        &self,
        guard: LoadingGuard<'_>,
        outcome: Result<T>,
        apply: impl FnOnce(&mut SessionState, &T),
    ) -> Result<T> {
        {
            let mut state = self.lock();
            match &outcome {
                Ok(value) => apply(&mut *state, value),
                Err(err) => {
                    warn!("{}", err);
                    state.error = Some(err.to_string());
                }
            }
        }
        drop(guard);
        outcome
    }

    /// Run the whole pipeline on an uploaded file.
    ///
    /// On success the records replace the previous ones and any earlier
    /// snapshot is dropped in the same step. On failure only the error
    /// message changes; previous records and snapshot stay as they were.
    ///
    /// # Arguments
    /// * `path` - Spreadsheet on disk (`.xlsx`, `.xls`, ...)
    ///
    /// # Returns
    /// * `Result<usize>` - Number of records now held by the session
    ///
    /// # Examples
    /// ```no_run
    /// use node_status::Session;
    ///
    /// # async fn demo() -> node_status::Result<()> {
    /// let session = Session::default();
    /// let count = session.upload("nodes.xlsx").await?;
    /// println!("{} nodes", count);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn upload(&self, path: impl AsRef<Path>) -> Result<usize> {
        let guard = self.begin()?;
        let path = path.as_ref();
        info!("processing upload {}", path.display());

        let outcome = async {
            check_extension(path)?;
            let bytes = read_upload(path).await?;
            process_rows(decode_rows(bytes)?, &self.settings)
        }
        .await;

        self.finish(guard, outcome, |state, records| {
            state.records = Some(records.clone());
            state.snapshot = None;
            state.error = None;
        })
        .map(|records| records.len())
    }

    /// Render the snapshot image of the current records.
    pub async fn generate_snapshot(&self) -> Result<Artifact> {
        let guard = self.begin()?;
        let records = self.lock().records.clone();

        let outcome = match records {
            Some(records) if !records.is_empty() => render_snapshot(records, &self.settings).await,
            _ => Err(NodeStatusError::Export("no node data loaded".into())),
        };

        self.finish(guard, outcome, |state, artifact| {
            state.snapshot = Some(artifact.clone());
        })
    }

    /// Encode the current records as the styled workbook.
    ///
    /// Does not touch the records or the snapshot.
    pub fn export_workbook(&self) -> Result<Artifact> {
        let records = self.lock().records.clone().unwrap_or_default();
        let outcome = to_xlsx(&records, &self.settings);
        if let Err(err) = &outcome {
            warn!("{}", err);
            self.lock().error = Some(err.to_string());
        }
        outcome
    }
}

fn lock_state(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Holds the busy flag of a [`Session`] for the duration of one run.
struct LoadingGuard<'a> {
    state: &'a Mutex<SessionState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        lock_state(self.state).is_loading = false;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_without_data_is_reported() {
        let session = Session::default();
        let err = session.export_workbook().unwrap_err();
        assert!(matches!(err, NodeStatusError::Export(_)));

        let state = session.state();
        assert!(state.error.is_some());
        assert!(state.records.is_none());
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn snapshot_without_data_is_reported() {
        let session = Session::default();
        let err = session.generate_snapshot().await.unwrap_err();
        assert!(matches!(err, NodeStatusError::Export(_)));
        assert!(!session.state().is_loading);
    }

    #[test]
    fn second_trigger_while_loading_is_busy() {
        let session = Session::default();
        let guard = session.begin().unwrap();
        assert!(matches!(session.begin(), Err(NodeStatusError::Busy)));
        drop(guard);
        assert!(session.begin().is_ok());
    }

    #[tokio::test]
    async fn abandoned_upload_releases_the_session() {
        let session = Session::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nodes.xlsx");
        std::fs::write(&path, b"not a workbook").unwrap();

        let _ = tokio::time::timeout(std::time::Duration::ZERO, session.upload(&path)).await;

        assert!(!session.state().is_loading);
        assert!(session.begin().is_ok());
    }

    #[tokio::test]
    async fn unreadable_upload_keeps_previous_records() {
        let session = Session::default();
        session.lock().records = Some(Vec::new());

        let dir = tempfile::tempdir().unwrap();
        let err = session.upload(dir.path().join("gone.xlsx")).await.unwrap_err();
        assert!(matches!(err, NodeStatusError::FileRead(_)));

        let state = session.state();
        assert_eq!(state.records, Some(Vec::new()));
        assert!(state.error.unwrap().starts_with("Failed to read the file"));
    }
}
