/// Task model with owner-constrained database operations
///
/// Every read, update, and delete here is filtered by `owner_id` in the same
/// WHERE clause as the id match. A task that exists but belongs to another
/// user yields the same `None` as a task that does not exist at all — callers
/// cannot distinguish "forbidden" from "missing", so resource existence never
/// leaks to non-owners.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     text TEXT NOT NULL,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     completed_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Invariant: `completed_at` is set iff `completed` is true. The transition
/// logic lives in a single UPDATE statement so the two fields cannot drift
/// under concurrent patches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// An ownable task item
///
/// `owner_id` is stamped from the authenticated identity at creation and is
/// immutable afterwards; no update path accepts it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// Owning user, assigned at creation
    pub owner_id: Uuid,

    /// Task text, non-empty and trimmed
    pub text: String,

    /// Completion state
    pub completed: bool,

    /// When the task was completed; absent while incomplete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Fields a caller may patch on an owned task
///
/// Only `text` and `completed` are patchable; `owner_id` and `completed_at`
/// are derived server-side.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    /// New task text (already validated and trimmed by the caller)
    pub text: Option<String>,

    /// New completion state
    pub completed: Option<bool>,
}

impl Task {
    /// Creates a task owned by `owner_id`
    ///
    /// The owner comes from the authenticated identity, never from the
    /// request payload.
    pub async fn create(pool: &PgPool, owner_id: Uuid, text: &str) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (owner_id, text)
            VALUES ($1, $2)
            RETURNING id, owner_id, text, completed, completed_at, created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(text)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by id, constrained to the given owner
    ///
    /// # Returns
    ///
    /// `None` for a missing id and for an id owned by someone else — the two
    /// outcomes are intentionally identical.
    pub async fn find_owned(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, text, completed, completed_at, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists all tasks owned by `owner_id`, oldest first
    pub async fn list_owned(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, text, completed, completed_at, created_at, updated_at
            FROM tasks
            WHERE owner_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Applies a patch to an owned task
    ///
    /// A single owner-constrained UPDATE carries the completion state
    /// machine in its CASE arms:
    ///
    /// - incomplete → complete: `completed_at` stamped with the current time
    /// - complete → incomplete: `completed_at` cleared
    /// - complete → complete: no-op, the original `completed_at` is kept
    /// - incomplete → incomplete: no-op
    ///
    /// # Returns
    ///
    /// The updated task, or `None` if no row matched (missing id or
    /// non-owner — indistinguishable by design).
    pub async fn update_owned(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
        patch: TaskPatch,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET text = COALESCE($3, text),
                completed = COALESCE($4, completed),
                completed_at = CASE
                    WHEN $4 IS TRUE AND completed IS NOT TRUE THEN NOW()
                    WHEN $4 IS FALSE THEN NULL
                    ELSE completed_at
                END,
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, text, completed, completed_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(patch.text)
        .bind(patch.completed)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes an owned task
    ///
    /// # Returns
    ///
    /// True if a row was deleted; false for a missing id or a non-owner's
    /// request (identical outcome).
    pub async fn delete_owned(pool: &PgPool, id: Uuid, owner_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_at_absent_in_json_when_incomplete() {
        let task = Task {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            text: "Walk the dog".to_string(),
            completed: false,
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&task).unwrap();
        assert!(!json.contains("completed_at"));
    }

    #[test]
    fn test_completed_at_present_in_json_when_complete() {
        let task = Task {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            text: "Walk the dog".to_string(),
            completed: true,
            completed_at: Some(Utc::now()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("completed_at"));
    }

    #[test]
    fn test_task_patch_default_is_empty() {
        let patch = TaskPatch::default();
        assert!(patch.text.is_none());
        assert!(patch.completed.is_none());
    }
}
