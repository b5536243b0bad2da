use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};

use taskhub_core::{Actor, ServiceError};

use crate::api::AppState;
use crate::model::{AssignRequest, AssigneeRef, CreateTaskRequest, Task};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/tasks/{id}/assignees", get(get_assignees).post(assign_users))
        .route("/tasks/{id}/assignees/{user_id}", axum::routing::delete(unassign_user))
}

// ---------------------------------------------------------------------------
// GET /tasks
// ---------------------------------------------------------------------------

async fn list_tasks(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let items = svc.list_tasks(&actor)?;
    Ok(Json(serde_json::json!({
        "items": items,
        "total": items.len(),
    })))
}

// ---------------------------------------------------------------------------
// POST /tasks
// ---------------------------------------------------------------------------

async fn create_task(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ServiceError> {
    let task = svc.create_task(&actor, input)?;
    Ok((StatusCode::CREATED, Json(task)))
}

// ---------------------------------------------------------------------------
// GET /tasks/:id
// ---------------------------------------------------------------------------

async fn get_task(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ServiceError> {
    let task = svc.get_task(&actor, &id)?;
    Ok(Json(task))
}

// ---------------------------------------------------------------------------
// PUT /tasks/:id — JSON merge-patch semantics
// ---------------------------------------------------------------------------

async fn update_task(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<Task>, ServiceError> {
    let task = svc.update_task(&actor, &id, patch)?;
    Ok(Json(task))
}

// ---------------------------------------------------------------------------
// DELETE /tasks/:id — returns the deleted record
// ---------------------------------------------------------------------------

async fn delete_task(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ServiceError> {
    let task = svc.delete_task(&actor, &id)?;
    Ok(Json(task))
}

// ---------------------------------------------------------------------------
// GET /tasks/:id/assignees
// ---------------------------------------------------------------------------

async fn get_assignees(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AssigneeRef>>, ServiceError> {
    let refs = svc.get_assignees(&actor, &id)?;
    Ok(Json(refs))
}

// ---------------------------------------------------------------------------
// POST /tasks/:id/assignees
// ---------------------------------------------------------------------------

async fn assign_users(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(input): Json<AssignRequest>,
) -> Result<Json<Vec<AssigneeRef>>, ServiceError> {
    let refs = svc.assign_users(&actor, &id, &input.user_ids)?;
    Ok(Json(refs))
}

// ---------------------------------------------------------------------------
// DELETE /tasks/:id/assignees/:user_id
// ---------------------------------------------------------------------------

async fn unassign_user(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<Json<Vec<AssigneeRef>>, ServiceError> {
    let refs = svc.unassign_user(&actor, &id, &user_id)?;
    Ok(Json(refs))
}
