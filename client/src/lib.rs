//! # Billdesk client
//!
//! Session and authentication pipeline for the Billdesk quoting and
//! invoicing API.
//!
//! Two independent sessions exist: the tenant workspace and the
//! platform-admin area. Every request goes through [`api::AuthClient`], which
//! attaches the right bearer credential, recovers expired tenant credentials
//! with a single shared refresh, and logs a session out when authentication
//! fails for good.

pub mod api;
mod app;
pub mod core;
pub mod data;
pub mod routes;
pub mod session;
pub mod utils;
