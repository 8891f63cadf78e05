//! Durable storage for session state

pub mod session;

pub use session::{SessionBackend, StorageError};
