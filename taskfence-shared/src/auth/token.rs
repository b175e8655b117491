/// Bearer-token issuance, verification, and revocation
///
/// Tokens are JWTs signed with HS256 carrying `{sub: user_id, scope}` claims.
/// Signing alone is not sufficient for a token to be accepted: every issued
/// token is also appended to the user's active-session list (`user_tokens`),
/// and [`verify`] requires the presented token to still be a member of that
/// list. Removing the row is how revocation works — no separate blacklist.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Secret**: injected from configuration, at least 32 bytes
/// - **Expiration**: configurable TTL, validated on decode
/// - **Revocation**: by list-membership; a correctly signed, unexpired token
///   is rejected once its row is gone
///
/// # Example
///
/// ```
/// use taskfence_shared::auth::token::{sign, decode_token, Claims, TokenScope};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let claims = Claims::new(user_id, TokenScope::Auth, Duration::hours(24));
/// let token = sign(&claims, "secret-key-at-least-32-bytes-long!!")?;
///
/// let decoded = decode_token(&token, "secret-key-at-least-32-bytes-long!!")?;
/// assert_eq!(decoded.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::token::UserToken;
use crate::models::user::User;

/// Issuer claim stamped into every token
const ISSUER: &str = "taskfence";

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Structural or signature failure on decode
    #[error("Invalid token: {0}")]
    Invalid(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token decodes correctly but is no longer in the user's session list
    /// (or the user no longer exists)
    #[error("Token has been revoked")]
    Revoked,

    /// Store-layer failure while checking session membership
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),
}

/// Scope a token was issued for
///
/// Stored alongside the token in the user's session list; verification
/// requires the `{scope, token}` pair to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenScope {
    /// Interactive session authentication
    Auth,
}

impl TokenScope {
    /// Gets scope as the string persisted in the store
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenScope::Auth => "auth",
        }
    }
}

/// JWT claims structure
///
/// # Claims
///
/// - `sub`: Subject (user ID)
/// - `scope`: Scope the token was issued for
/// - `iss`: Issuer (always "taskfence")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Scope (custom claim)
    pub scope: TokenScope,

    /// Issuer - Always "taskfence"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates new claims expiring `ttl` from now
    pub fn new(user_id: Uuid, scope: TokenScope, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            scope,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Authenticated identity resolved from a presented token
///
/// Produced only by [`verify`]; handlers receive it via request extensions.
/// There is no anonymous variant — an unverifiable token never yields a
/// partial identity.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The user the token belongs to
    pub user: User,

    /// Scope the token was issued for
    pub scope: TokenScope,

    /// The presented token itself (needed to revoke the current session)
    pub token: String,
}

/// Signs claims into an opaque token string
///
/// # Errors
///
/// Returns `TokenError::CreateError` if encoding fails
pub fn sign(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| TokenError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Decodes a token and checks its structural validity
///
/// Verifies the signature, expiration, and issuer. This is only the first
/// half of verification — it says nothing about revocation. Use [`verify`]
/// for the full check.
///
/// # Errors
///
/// Returns `TokenError::Expired` or `TokenError::Invalid`; never panics on
/// malformed input.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Issues a new token for a user
///
/// Signs the claims, then appends the `{scope, token}` pair to the user's
/// session list with a single atomic INSERT — there is no read-modify-write
/// window, so concurrent logins from multiple sessions cannot lose entries,
/// and a client disconnect cannot leave the list half-applied.
///
/// # Errors
///
/// Returns `TokenError::CreateError` if signing fails, `TokenError::Store`
/// if persisting the session row fails.
pub async fn issue(
    pool: &PgPool,
    secret: &str,
    ttl: Duration,
    user_id: Uuid,
    scope: TokenScope,
) -> Result<String, TokenError> {
    let claims = Claims::new(user_id, scope, ttl);
    let token = sign(&claims, secret)?;

    UserToken::append(pool, user_id, scope, &token).await?;

    tracing::debug!(user_id = %user_id, scope = scope.as_str(), "Issued token");
    Ok(token)
}

/// Verifies a presented token and resolves the identity behind it
///
/// Two checks, both required:
///
/// 1. **Structural**: signature, expiration, and issuer via [`decode_token`].
/// 2. **Membership**: a user row must exist with `id == claims.sub`, and the
///    user's session list must contain the exact `{scope, token}` pair.
///
/// The second check is what makes revocation effective: a structurally valid
/// token whose row was removed is rejected with `TokenError::Revoked`.
///
/// # Errors
///
/// Every failure mode is a typed error — callers never see a panic and never
/// receive a partial identity.
pub async fn verify(pool: &PgPool, secret: &str, token: &str) -> Result<AuthSession, TokenError> {
    let claims = decode_token(token, secret)?;

    let user = User::find_by_id(pool, claims.sub)
        .await?
        .ok_or(TokenError::Revoked)?;

    let live = UserToken::contains(pool, user.id, claims.scope, token).await?;
    if !live {
        return Err(TokenError::Revoked);
    }

    Ok(AuthSession {
        user,
        scope: claims.scope,
        token: token.to_string(),
    })
}

/// Revokes a token by removing it from the user's session list
///
/// A single DELETE by value; idempotent — revoking a token that is already
/// absent is a no-op, not an error, so clients can safely retry.
pub async fn revoke(pool: &PgPool, user_id: Uuid, token: &str) -> Result<(), TokenError> {
    let removed = UserToken::remove(pool, user_id, token).await?;

    tracing::debug!(user_id = %user_id, removed, "Revoked token");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, TokenScope::Auth, Duration::hours(24));

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.scope, TokenScope::Auth);
        assert_eq!(claims.iss, "taskfence");
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_sign_and_decode_roundtrip() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, TokenScope::Auth, Duration::hours(1));
        let token = sign(&claims, SECRET).expect("Should create token");

        let decoded = decode_token(&token, SECRET).expect("Should decode token");
        assert_eq!(decoded.sub, user_id);
        assert_eq!(decoded.scope, TokenScope::Auth);
        assert_eq!(decoded.iss, "taskfence");
    }

    #[test]
    fn test_decode_with_wrong_secret() {
        let claims = Claims::new(Uuid::new_v4(), TokenScope::Auth, Duration::hours(1));
        let token = sign(&claims, SECRET).expect("Should create token");

        let result = decode_token(&token, "wrong-secret-also-32-bytes-long!!!!!");
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_decode_garbage() {
        let result = decode_token("not-a-token", SECRET);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_decode_expired_token() {
        let claims = Claims::new(Uuid::new_v4(), TokenScope::Auth, Duration::seconds(-3600));
        assert!(claims.is_expired());

        let token = sign(&claims, SECRET).expect("Should create token");
        let result = decode_token(&token, SECRET);

        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let claims = Claims::new(Uuid::new_v4(), TokenScope::Auth, Duration::hours(1));
        let token = sign(&claims, SECRET).expect("Should create token");

        // Flip a character in the payload segment
        let mut chars: Vec<char> = token.chars().collect();
        let mid = chars.len() / 2;
        chars[mid] = if chars[mid] == 'a' { 'b' } else { 'a' };
        let tampered: String = chars.into_iter().collect();

        assert!(decode_token(&tampered, SECRET).is_err());
    }

    #[test]
    fn test_scope_string() {
        assert_eq!(TokenScope::Auth.as_str(), "auth");
    }
}
