/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `users`: Signup, login, current user, token revocation
/// - `tasks`: Owner-scoped task CRUD

pub mod health;
pub mod tasks;
pub mod users;
