//! # Taskfence Shared Library
//!
//! This crate contains the models and auth primitives used by the Taskfence
//! API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and owner-constrained data access
//! - `auth`: Password hashing and bearer-token issuance/verification
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Taskfence shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
