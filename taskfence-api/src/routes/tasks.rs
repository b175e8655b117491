/// Owner-scoped task endpoints
///
/// Every route here sits behind the auth gate; handlers read the caller's
/// identity from the [`AuthSession`] extension and pass it into the
/// owner-constrained queries. A task that belongs to someone else produces
/// the same 404 as a task that does not exist, and so does a malformed id —
/// the three cases are indistinguishable from outside.
///
/// # Endpoints
///
/// - `POST /v1/tasks` - Create a task (owner stamped server-side)
/// - `GET /v1/tasks` - List the caller's tasks
/// - `GET /v1/tasks/:id` - Fetch one owned task
/// - `PATCH /v1/tasks/:id` - Update text/completion of one owned task
/// - `DELETE /v1/tasks/:id` - Delete one owned task
///
/// [`AuthSession`]: taskfence_shared::auth::token::AuthSession

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, FieldError},
    extract::JsonBody,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskfence_shared::{
    auth::token::AuthSession,
    models::task::{Task, TaskPatch},
};
use uuid::Uuid;

/// Create-task request
///
/// Only `text` is accepted. Any owner field a client smuggles into the
/// payload is ignored — ownership comes from the authenticated identity.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Task text
    pub text: String,
}

/// Patch-task request
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    /// New task text
    pub text: Option<String>,

    /// New completion state
    pub completed: Option<bool>,
}

/// List response
#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    /// Tasks owned by the caller, oldest first
    pub tasks: Vec<Task>,
}

/// Trims task text and rejects empty input
fn normalize_text(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Validation failure for missing/blank task text
fn empty_text_error() -> ApiError {
    ApiError::Validation(vec![FieldError {
        field: "text".to_string(),
        message: "Text must not be empty".to_string(),
    }])
}

/// Parses a path id, folding malformed ids into the NotFound outcome
///
/// A syntactically invalid id cannot name an owned task, so it yields the
/// identical 404 a well-formed but absent id does.
fn parse_task_id(id: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| ApiError::NotFound("Task not found".to_string()))
}

/// Creates a task owned by the caller
///
/// # Endpoint
///
/// ```text
/// POST /v1/tasks
/// Authorization: Bearer <token>
///
/// { "text": "Walk the dog" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: empty or whitespace-only text
pub async fn create_task(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    JsonBody(req): JsonBody<CreateTaskRequest>,
) -> ApiResult<impl IntoResponse> {
    let text = normalize_text(&req.text).ok_or_else(empty_text_error)?;

    let task = Task::create(&state.db, session.user.id, &text).await?;

    tracing::debug!(task_id = %task.id, owner_id = %task.owner_id, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Lists the caller's tasks
///
/// Only tasks whose `owner_id` matches the authenticated identity are
/// returned; there is no unfiltered listing.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> ApiResult<Json<TaskListResponse>> {
    let tasks = Task::list_owned(&state.db, session.user.id).await?;

    Ok(Json(TaskListResponse { tasks }))
}

/// Fetches one owned task
///
/// # Errors
///
/// - `404 Not Found`: missing id, someone else's task, or malformed id
pub async fn get_task(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let id = parse_task_id(&id)?;

    let task = Task::find_owned(&state.db, id, session.user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Updates text and/or completion state of one owned task
///
/// Completion transitions: setting `completed: true` on an incomplete task
/// stamps `completed_at`; setting `completed: false` clears it; re-applying
/// the current state is accepted and leaves `completed_at` untouched.
///
/// # Errors
///
/// - `400 Bad Request`: `text` present but empty after trimming
/// - `404 Not Found`: missing id, someone else's task, or malformed id
pub async fn update_task(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let id = parse_task_id(&id)?;

    let text = match req.text {
        Some(raw) => Some(normalize_text(&raw).ok_or_else(empty_text_error)?),
        None => None,
    };

    let patch = TaskPatch {
        text,
        completed: req.completed,
    };

    let task = Task::update_owned(&state.db, id, session.user.id, patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Deletes one owned task
///
/// # Errors
///
/// - `404 Not Found`: missing id, someone else's task, or malformed id
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_task_id(&id)?;

    let deleted = Task::delete_owned(&state.db, id, session.user.id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    tracing::debug!(task_id = %id, owner_id = %session.user.id, "Task deleted");

    Ok(StatusCode::OK)
}
