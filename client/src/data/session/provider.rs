use super::error::StorageError;

/// Key/value store backing the session stores.
///
/// Calls are synchronous: every session mutation writes through before it
/// returns, and startup reads happen exactly once.
pub trait SessionBackend: Send + Sync + std::fmt::Debug {
    /// Read the raw value stored under `key`
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Human-readable backend name
    fn name(&self) -> &'static str;

    /// Whether values survive a process restart
    fn is_persistent(&self) -> bool {
        true
    }
}
