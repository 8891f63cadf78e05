//! Utility functions for the client

pub mod file;
