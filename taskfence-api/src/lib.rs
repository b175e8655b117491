//! # Taskfence API Server Library
//!
//! This library provides the core functionality for the Taskfence API server.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder, and the auth gate middleware
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Request extractors with API-native rejections
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
