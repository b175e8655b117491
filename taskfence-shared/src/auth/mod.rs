/// Authentication primitives for Taskfence
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing with an injected work factor
/// - [`token`]: Bearer-token issuance, verification, and revocation
///
/// Tokens are only valid while a matching row exists in the user's
/// active-session list; revocation removes the row rather than maintaining a
/// separate blacklist.
///
/// # Example
///
/// ```no_run
/// use taskfence_shared::auth::password::{hash_password, verify_password, HashParams};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let params = HashParams::default();
/// let hash = hash_password("user_password", &params)?;
/// assert!(verify_password("user_password", &hash)?);
/// # Ok(())
/// # }
/// ```

pub mod password;
pub mod token;
