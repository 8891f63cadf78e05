use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::core::constants::SESSION_FILE_NAME;

use super::error::StorageError;
use super::provider::SessionBackend;

/// JSON file holding every session key (`{ "key": "value" }`).
///
/// The file is read once at init and rewritten atomically on each mutation.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileBackend {
    pub fn init(data_dir: &Path) -> Result<Self, StorageError> {
        let path = data_dir.join(SESSION_FILE_NAME);
        let values = Self::load(&path)?;
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<BTreeMap<String, String>>(&json) {
                Ok(values) => {
                    tracing::debug!(count = values.len(), "Loaded session file");
                    Ok(values)
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Corrupted session file, creating backup and starting fresh"
                    );
                    let backup = format!(
                        "{}.corrupt.{}",
                        path.display(),
                        chrono::Utc::now().timestamp()
                    );
                    if let Err(rename_err) = std::fs::rename(path, &backup) {
                        tracing::warn!(error = %rename_err, "Failed to backup corrupted session file");
                    } else {
                        tracing::info!(backup = %backup, "Backed up corrupted session file");
                    }
                    Ok(BTreeMap::new())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No existing session file");
                Ok(BTreeMap::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn atomic_write(path: &Path, json: &str) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Persist the map. Called with the lock held so writes land in mutation order.
    fn save(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(values)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        Self::atomic_write(&self.path, &json)
    }
}

impl SessionBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock();
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock();
        if values.remove(key).is_none() {
            return Ok(());
        }
        self.save(&values)
    }

    fn name(&self) -> &'static str {
        "File"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_backend_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let backend = FileBackend::init(dir.path()).unwrap();
        backend.write("billdesk.session", r#"{"token":"t1"}"#).unwrap();
        backend.write("other", "x").unwrap();
        backend.remove("other").unwrap();
        drop(backend);

        let reopened = FileBackend::init(dir.path()).unwrap();
        assert_eq!(
            reopened.read("billdesk.session").unwrap().as_deref(),
            Some(r#"{"token":"t1"}"#)
        );
        assert!(reopened.read("other").unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_is_backed_up_and_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SESSION_FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();

        let backend = FileBackend::init(dir.path()).unwrap();
        assert!(backend.read("billdesk.session").unwrap().is_none());

        let backups: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".corrupt."))
            .collect();
        assert_eq!(backups.len(), 1);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::init(dir.path()).unwrap();
        assert!(backend.read("anything").unwrap().is_none());
        assert!(!backend.path().exists());
    }
}
