/// Per-user active-session rows
///
/// Each row is one `{scope, token}` entry in a user's session list. Append is
/// a single INSERT and remove is a single DELETE by value, each atomic per
/// statement with no read-modify-write round trip, so concurrent logins and
/// logouts from multiple sessions cannot lose each other's updates.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE user_tokens (
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     scope TEXT NOT NULL,
///     token TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (user_id, token)
/// );
/// ```

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::token::TokenScope;

/// One entry in a user's active-session list
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserToken {
    /// Owning user
    pub user_id: Uuid,

    /// Scope the token was issued for
    pub scope: String,

    /// The opaque token string
    pub token: String,

    /// When the session was opened
    pub created_at: DateTime<Utc>,
}

impl UserToken {
    /// Appends a `{scope, token}` entry to the user's session list
    ///
    /// Single atomic INSERT; by the time this returns, the session either
    /// fully exists or does not exist at all.
    pub async fn append(
        pool: &PgPool,
        user_id: Uuid,
        scope: TokenScope,
        token: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO user_tokens (user_id, scope, token)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(scope.as_str())
        .bind(token)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Removes a token from the user's session list by value
    ///
    /// Idempotent: removing an absent token affects zero rows and is not an
    /// error.
    ///
    /// # Returns
    ///
    /// True if an entry was removed, false if no matching entry existed
    pub async fn remove(pool: &PgPool, user_id: Uuid, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_tokens
            WHERE user_id = $1 AND token = $2
            "#,
        )
        .bind(user_id)
        .bind(token)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Checks whether the user's session list contains the exact
    /// `{scope, token}` pair
    ///
    /// This is the membership half of token verification: a signed token
    /// whose entry is gone reads as revoked.
    pub async fn contains(
        pool: &PgPool,
        user_id: Uuid,
        scope: TokenScope,
        token: &str,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM user_tokens
                WHERE user_id = $1 AND scope = $2 AND token = $3
            )
            "#,
        )
        .bind(user_id)
        .bind(scope.as_str())
        .bind(token)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Lists the user's active sessions, oldest first
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tokens = sqlx::query_as::<_, UserToken>(
            r#"
            SELECT user_id, scope, token, created_at
            FROM user_tokens
            WHERE user_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tokens)
    }
}
