//! Session storage backends
//!
//! | Backend | Persistence | Notes |
//! |---------|-------------|-------|
//! | `file` | data directory `session.json` | default |
//! | `keyring` | OS keychain / credential manager | falls back to `file` when unavailable |
//! | `memory` | none | tests and throwaway runs |

mod error;
mod file;
mod keyring;
mod memory;
mod provider;

pub use error::StorageError;
pub use file::FileBackend;
pub use self::keyring::KeyringBackend;
pub use memory::MemoryBackend;
pub use provider::SessionBackend;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::core::config::StorageBackend;
use crate::core::constants::KEYRING_SERVICE_NAME;
use crate::core::storage::AppStorage;

/// Construct the configured backend
pub fn open_backend(kind: StorageBackend, storage: &AppStorage) -> Result<Arc<dyn SessionBackend>> {
    let backend: Arc<dyn SessionBackend> = match kind {
        StorageBackend::File => Arc::new(
            FileBackend::init(storage.data_dir()).context("Failed to open session file")?,
        ),
        StorageBackend::Keyring => match KeyringBackend::init(KEYRING_SERVICE_NAME) {
            Ok(backend) => Arc::new(backend),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Keychain unavailable, falling back to file-based session storage"
                );
                Arc::new(
                    FileBackend::init(storage.data_dir())
                        .context("Failed to open session file")?,
                )
            }
        },
        StorageBackend::Memory => Arc::new(MemoryBackend::new()),
    };

    if !backend.is_persistent() {
        tracing::warn!(
            backend = backend.name(),
            "Session storage is not persistent; sessions end with the process"
        );
    }
    tracing::debug!(backend = backend.name(), "Session storage initialized");
    Ok(backend)
}
