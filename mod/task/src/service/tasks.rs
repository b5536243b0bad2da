use taskhub_core::{merge_patch, new_id, now_rfc3339, Actor, Role};

use crate::authz::{ensure_allowed, TaskAction};
use crate::model::{CreateTaskRequest, Task};
use crate::service::{ensure_id, TaskError, TaskService};
use crate::store;

impl TaskService {
    /// Create a new task owned by the actor. Admin tier required.
    pub fn create_task(&self, actor: &Actor, input: CreateTaskRequest) -> Result<Task, TaskError> {
        ensure_allowed(actor, TaskAction::Create, None)?;
        require_text("title", &input.title)?;
        require_text("description", &input.description)?;

        let now = now_rfc3339();
        let task = Task {
            id: new_id(),
            title: input.title.trim().to_string(),
            description: input.description.trim().to_string(),
            created_by: actor.id.clone(),
            assigned_to: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        };

        self.store.insert(&task)?;
        tracing::info!(task_id = %task.id, owner = %task.created_by, "task created");
        Ok(task)
    }

    /// Get a single task. Any authenticated actor may read any task by
    /// id — reads are deliberately not ownership-checked.
    pub fn get_task(&self, actor: &Actor, id: &str) -> Result<Task, TaskError> {
        ensure_id("task id", id)?;
        let task = self.store.get(id)?;
        ensure_allowed(actor, TaskAction::Read, Some(&task))?;
        Ok(task)
    }

    /// List the tasks this actor may see, newest first.
    ///
    /// The role shapes the query itself rather than filtering rows
    /// after the fact: Root sees everything, an Admin sees what they
    /// own, a User sees what they are assigned to. An empty result is
    /// an empty list, not an error.
    pub fn list_tasks(&self, actor: &Actor) -> Result<Vec<Task>, TaskError> {
        ensure_allowed(actor, TaskAction::ReadAll, None)?;
        match actor.role {
            Role::Root => self.store.list_all(),
            Role::Admin => self.store.list_created_by(&actor.id),
            Role::User => self.store.list_assigned_to(&actor.id),
        }
    }

    /// Apply a JSON merge-patch to a task.
    ///
    /// `id`, `created_by`, `created_at`, and `assigned_to` cannot be
    /// patched — ownership never moves, and the assignment set belongs
    /// to the assignment workflow.
    pub fn update_task(
        &self,
        actor: &Actor,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<Task, TaskError> {
        ensure_id("task id", id)?;
        let current = self.store.get(id)?;
        ensure_allowed(actor, TaskAction::Update, Some(&current))?;

        let mut base =
            serde_json::to_value(&current).map_err(|e| TaskError::Internal(e.to_string()))?;
        merge_patch(&mut base, &patch);

        base["id"] = serde_json::json!(current.id);
        base["created_by"] = serde_json::json!(current.created_by);
        base["created_at"] = serde_json::json!(current.created_at);
        base["assigned_to"] = serde_json::json!(current.assigned_to);
        base["updated_at"] = serde_json::json!(now_rfc3339());

        let updated: Task = serde_json::from_value(base)
            .map_err(|e| TaskError::Validation(format!("invalid patch: {e}")))?;

        require_text("title", &updated.title)?;
        require_text("description", &updated.description)?;

        self.store.update_data(&updated)?;
        Ok(updated)
    }

    /// Delete a task and drop it from every assignee's task set, in
    /// one transaction. Returns the deleted record.
    pub fn delete_task(&self, actor: &Actor, id: &str) -> Result<Task, TaskError> {
        ensure_id("task id", id)?;
        let task = self.store.get(id)?;
        ensure_allowed(actor, TaskAction::Delete, Some(&task))?;

        let mut stmts = Vec::new();
        for user_id in &task.assigned_to {
            if let Some(mut user) = self.store.load_user_value(user_id)? {
                super::remove_from_set(&mut user, "tasks", id);
                stmts.push(store::stmt_update_user_data(user_id, &user)?);
            }
        }
        stmts.push(store::stmt_clear_assignees(id));
        stmts.push(store::stmt_delete_task(id));

        self.store
            .apply(&stmts)
            .map_err(|e| TaskError::Storage(e.to_string()))?;

        tracing::info!(task_id = %id, "task deleted");
        Ok(task)
    }
}

/// Reject blank required text fields.
fn require_text(field: &str, value: &str) -> Result<(), TaskError> {
    if value.trim().is_empty() {
        return Err(TaskError::Validation(format!("{field} is required")));
    }
    Ok(())
}
