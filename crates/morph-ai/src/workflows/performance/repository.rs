use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use super::domain::{EmployeeId, EvaluationRecord};

/// Per-employee record store. Writes merge into the persisted set; ids outside a
/// batch are preserved and ids inside it are overwritten.
pub trait SummaryStore: Send + Sync {
    fn all(&self) -> Result<BTreeMap<EmployeeId, EvaluationRecord>, RepositoryError>;

    /// Merges `records` into the store and returns the number of stored records afterwards.
    fn merge(
        &self,
        records: BTreeMap<EmployeeId, EvaluationRecord>,
    ) -> Result<usize, RepositoryError>;

    fn get(&self, id: &EmployeeId) -> Result<Option<EvaluationRecord>, RepositoryError> {
        Ok(self.all()?.remove(id))
    }

    fn find_by_name(&self, name: &str) -> Result<Option<EvaluationRecord>, RepositoryError> {
        let needle = name.trim().to_lowercase();
        Ok(self
            .all()?
            .into_values()
            .find(|record| record.employee_name.trim().to_lowercase() == needle))
    }

    /// Records created within the last `days` days relative to `now`.
    fn recent(
        &self,
        days: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        let cutoff = now - Duration::days(i64::from(days));
        Ok(self
            .all()?
            .into_values()
            .filter(|record| record.created_at >= cutoff)
            .collect())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("failed to access summary store at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize summary store: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("summary store unavailable: {0}")]
    Unavailable(String),
}

/// Store persisted as one JSON object keyed by employee id.
#[derive(Debug)]
pub struct JsonFileSummaryStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileSummaryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<EmployeeId, EvaluationRecord>, RepositoryError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "summary store not created yet");
                return Ok(BTreeMap::new());
            }
            Err(source) => {
                return Err(RepositoryError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        match serde_json::from_str(&raw) {
            Ok(records) => Ok(records),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "summary store unreadable; treating as empty"
                );
                Ok(BTreeMap::new())
            }
        }
    }

    fn write(&self, records: &BTreeMap<EmployeeId, EvaluationRecord>) -> Result<(), RepositoryError> {
        let io_error = |source| RepositoryError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let payload = serde_json::to_string_pretty(records)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, payload).map_err(io_error)?;
        fs::rename(&staging, &self.path).map_err(io_error)?;
        Ok(())
    }
}

impl SummaryStore for JsonFileSummaryStore {
    fn all(&self) -> Result<BTreeMap<EmployeeId, EvaluationRecord>, RepositoryError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))?;
        self.read()
    }

    fn merge(
        &self,
        records: BTreeMap<EmployeeId, EvaluationRecord>,
    ) -> Result<usize, RepositoryError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))?;
        let mut stored = self.read()?;
        stored.extend(records);
        self.write(&stored)?;
        Ok(stored.len())
    }
}
