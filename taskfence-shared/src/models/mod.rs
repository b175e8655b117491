/// Database models for Taskfence
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts
/// - `token`: Per-user active-session rows backing token revocation
/// - `task`: Ownable task items with owner-constrained access
///
/// # Example
///
/// ```no_run
/// use taskfence_shared::models::user::{User, CreateUser};
/// use taskfence_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     email: "user@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod task;
pub mod token;
pub mod user;
