/// Password hashing using Argon2id
///
/// Hashes are produced in PHC string format: the per-call random salt and the
/// work-factor parameters are embedded in the output, so verification needs no
/// separate lookup.
///
/// The work factor is injected via [`HashParams`] (loaded from configuration
/// by the API server), never hardcoded at the call site. Hashing is CPU-bound;
/// callers on an async runtime should run it on a blocking worker
/// (`tokio::task::spawn_blocking`) rather than inline on the request path.
///
/// # Example
///
/// ```
/// use taskfence_shared::auth::password::{hash_password, verify_password, HashParams};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let params = HashParams { m_cost: 8192, t_cost: 1, p_cost: 1 };
/// let hash = hash_password("super_secret_password_123", &params)?;
///
/// assert!(verify_password("super_secret_password_123", &hash)?);
/// assert!(!verify_password("wrong_password", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Argon2id work-factor parameters
///
/// Loaded from configuration so the cost can be tuned per deployment without
/// a code change. The defaults match current OWASP guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    /// Memory cost in KiB
    pub m_cost: u32,

    /// Number of iterations
    pub t_cost: u32,

    /// Degree of parallelism
    pub p_cost: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            m_cost: 65536, // 64 MB
            t_cost: 3,
            p_cost: 4,
        }
    }
}

/// Hashes a password using Argon2id
///
/// A fresh 16-byte salt is generated from the OS RNG on every call, so hashing
/// the same password twice yields different outputs.
///
/// # Errors
///
/// Returns `PasswordError::HashError` if the parameters are invalid or the
/// underlying primitive fails. Failure here is propagated to the caller, never
/// swallowed.
///
/// # Example
///
/// ```
/// use taskfence_shared::auth::password::{hash_password, HashParams};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("my_password", &HashParams { m_cost: 8192, t_cost: 1, p_cost: 1 })?;
/// assert!(hash.starts_with("$argon2id$"));
/// # Ok(())
/// # }
/// ```
pub fn hash_password(password: &str, params: &HashParams) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(params.m_cost)
        .t_cost(params.t_cost)
        .p_cost(params.p_cost)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored hash
///
/// The parameters and salt are read back out of the PHC string, so no
/// `HashParams` are needed here. Comparison is constant-time.
///
/// # Returns
///
/// `Ok(true)` if the password matches, `Ok(false)` if it doesn't. A mismatch
/// is a normal negative result, not an error; only a malformed hash or a
/// primitive failure returns `Err`.
///
/// # Example
///
/// ```
/// use taskfence_shared::auth::password::{hash_password, verify_password, HashParams};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let params = HashParams { m_cost: 8192, t_cost: 1, p_cost: 1 };
/// let hash = hash_password("correct_password", &params)?;
///
/// assert!(verify_password("correct_password", &hash)?);
/// assert!(!verify_password("wrong_password", &hash)?);
/// # Ok(())
/// # }
/// ```
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    // The PHC parser accepts salt-only strings; a hash with no output can
    // never verify anything, so treat it as malformed rather than a mismatch.
    if parsed_hash.hash.is_none() {
        return Err(PasswordError::InvalidHash(
            "Hash carries no output".to_string(),
        ));
    }

    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false), // Wrong password
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Low-cost parameters so the test suite stays fast
    fn test_params() -> HashParams {
        HashParams {
            m_cost: 8192,
            t_cost: 1,
            p_cost: 1,
        }
    }

    #[test]
    fn test_hash_password_embeds_params() {
        let hash = hash_password("test_password_123", &test_params()).expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
        assert!(hash.contains("m=8192"));
        assert!(hash.contains("t=1"));
        assert!(hash.contains("p=1"));
    }

    #[test]
    fn test_hash_never_equals_password() {
        let password = "plaintext_password";
        let hash = hash_password(password, &test_params()).expect("Hash should succeed");
        assert_ne!(hash, password);
    }

    #[test]
    fn test_hash_password_produces_different_salts() {
        let password = "same_password";

        let hash1 = hash_password(password, &test_params()).expect("Hash 1 should succeed");
        let hash2 = hash_password(password, &test_params()).expect("Hash 2 should succeed");

        // Different salts = different hashes
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_correct() {
        let password = "correct_password";
        let hash = hash_password(password, &test_params()).expect("Hash should succeed");

        let result = verify_password(password, &hash).expect("Verify should succeed");
        assert!(result, "Correct password should verify");
    }

    #[test]
    fn test_verify_password_incorrect() {
        let password = "correct_password";
        let hash = hash_password(password, &test_params()).expect("Hash should succeed");

        let result = verify_password("wrong_password", &hash).expect("Verify should succeed");
        assert!(!result, "Wrong password should not verify");
    }

    #[test]
    fn test_verify_password_empty() {
        let hash = hash_password("password", &test_params()).expect("Hash should succeed");

        let result = verify_password("", &hash).expect("Verify should succeed");
        assert!(!result, "Empty password should not verify");
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        let result = verify_password("password", "invalid_hash");
        assert!(result.is_err(), "Invalid hash should return error");
    }

    #[test]
    fn test_verify_password_malformed_hash() {
        // Parses as a PHC string but carries no hash output; must be an
        // error, not a silent mismatch
        let result = verify_password("password", "$argon2id$invalid");
        assert!(
            matches!(result, Err(PasswordError::InvalidHash(_))),
            "Output-less hash should be InvalidHash, got {:?}",
            result
        );
    }

    #[test]
    fn test_hash_verify_roundtrip() {
        let passwords = vec![
            "simple",
            "with spaces",
            "with-special-chars!@#$%",
            "unicode-密码-パスワード",
            "very_long_password_that_is_longer_than_usual_passwords_123456789",
        ];

        for password in passwords {
            let hash = hash_password(password, &test_params()).expect("Hash should succeed");
            let verified = verify_password(password, &hash).expect("Verify should succeed");
            assert!(verified, "Password '{}' should verify", password);
        }
    }

    #[test]
    fn test_default_params_match_owasp_baseline() {
        let params = HashParams::default();
        assert_eq!(params.m_cost, 65536);
        assert_eq!(params.t_cost, 3);
        assert_eq!(params.p_cost, 4);
    }
}
