mod tasks;

use std::sync::Arc;

use axum::Router;

use crate::service::TaskService;

/// Shared application state for task handlers.
pub type AppState = Arc<TaskService>;

/// Build the task API router. Paths are absolute (`/tasks/...`); the
/// binary merges them and layers the bearer middleware on top, so every
/// handler can rely on an injected [`taskhub_core::Actor`].
pub fn build_router(svc: Arc<TaskService>) -> Router {
    tasks::routes().with_state(svc)
}
