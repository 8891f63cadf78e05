use keyring::Entry;

use super::error::StorageError;
use super::provider::SessionBackend;

const BACKEND_NAME: &str = "OS keychain";

/// One keychain entry per session key, under a shared service name
#[derive(Debug)]
pub struct KeyringBackend {
    service_name: String,
}

impl KeyringBackend {
    /// Open the keychain and verify it answers a lookup
    pub fn init(service_name: impl Into<String>) -> Result<Self, StorageError> {
        let backend = Self {
            service_name: service_name.into(),
        };
        // Probe so an unusable keychain surfaces at startup instead of on first login
        backend.read("probe")?;
        tracing::debug!(service = %backend.service_name, "Keychain session storage ready");
        Ok(backend)
    }

    fn entry(&self, key: &str) -> Result<Entry, StorageError> {
        Entry::new(&self.service_name, key)
            .map_err(|e| StorageError::backend(BACKEND_NAME, format!("keyring entry: {}", e)))
    }
}

impl SessionBackend for KeyringBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StorageError::backend(
                BACKEND_NAME,
                format!("read failed: {}", e),
            )),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entry(key)?
            .set_password(value)
            .map_err(|e| StorageError::backend(BACKEND_NAME, format!("save failed: {}", e)))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StorageError::backend(
                BACKEND_NAME,
                format!("delete failed: {}", e),
            )),
        }
    }

    fn name(&self) -> &'static str {
        BACKEND_NAME
    }
}
