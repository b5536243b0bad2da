//! Task module — task CRUD, role-gated authorization, and the
//! two-sided assignment workflow.
//!
//! # Resources
//!
//! - **Task** — owned by its creator (`created_by`, immutable), with a
//!   set of assigned user ids kept bidirectionally consistent with
//!   each user's task set
//!
//! Authorization is decided by [`authz::authorize`]; what a caller can
//! *list* is shaped by role in [`service::TaskService::list_tasks`].

pub mod api;
pub mod authz;
pub mod model;
pub mod service;
pub mod store;

use std::sync::Arc;

use axum::Router;

use taskhub_core::Module;

use crate::service::TaskService;

/// Task module implementing the Module trait.
pub struct TaskModule {
    service: Arc<TaskService>,
}

impl TaskModule {
    /// Create a new TaskModule, initializing the DB schema.
    ///
    /// Expects the auth module to have initialized the `users` table
    /// already — the assignment workflow writes both sides of the
    /// relation.
    pub fn new(
        sql: Arc<dyn taskhub_sql::SQLStore>,
    ) -> Result<Self, taskhub_core::ServiceError> {
        let service = TaskService::new(sql).map_err(taskhub_core::ServiceError::from)?;
        Ok(Self { service })
    }

    /// Get a reference to the underlying TaskService.
    pub fn service(&self) -> &Arc<TaskService> {
        &self.service
    }
}

impl Module for TaskModule {
    fn name(&self) -> &str {
        "task"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
