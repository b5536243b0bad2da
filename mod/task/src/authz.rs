//! The authorization decision function.
//!
//! One rule carries all the weight here: for mutations, Root alone is
//! sufficient, while Admin is necessary but NOT sufficient — an Admin
//! must also own the task (`created_by`). A non-owning Admin is denied.

use taskhub_core::{Actor, Role};

use crate::model::Task;
use crate::service::TaskError;

/// The actions the engine gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    Read,
    ReadAll,
    Create,
    Update,
    Delete,
    Assign,
    Unassign,
}

impl TaskAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::ReadAll => "list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Assign => "assign",
            Self::Unassign => "unassign",
        }
    }
}

impl std::fmt::Display for TaskAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The engine's verdict. Callers translate `Deny` into an error; the
/// function itself never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// Decide whether `actor` may perform `action` on `task`.
///
/// - `Read` / `ReadAll` need authentication only. Single-task reads are
///   deliberately not ownership-checked; listing is shaped per role by
///   the query router instead of gated here.
/// - `Create` needs the Admin tier or above.
/// - Mutations (`Update`, `Delete`, `Assign`, `Unassign`) need Root, or
///   Admin combined with ownership of the target task.
///
/// `task` is `None` for actions with no target (`Create`, `ReadAll`);
/// a mutation with no task to own is denied.
pub fn authorize(actor: &Actor, action: TaskAction, task: Option<&Task>) -> Decision {
    match action {
        TaskAction::Read | TaskAction::ReadAll => Decision::Allow,
        TaskAction::Create => {
            if actor.role >= Role::Admin {
                Decision::Allow
            } else {
                Decision::Deny
            }
        }
        TaskAction::Update | TaskAction::Delete | TaskAction::Assign | TaskAction::Unassign => {
            match (actor.role, task) {
                (Role::Root, _) => Decision::Allow,
                (Role::Admin, Some(t)) if t.created_by == actor.id => Decision::Allow,
                _ => Decision::Deny,
            }
        }
    }
}

/// Gate helper: map `Deny` to the unauthorized error callers surface.
pub fn ensure_allowed(
    actor: &Actor,
    action: TaskAction,
    task: Option<&Task>,
) -> Result<(), TaskError> {
    match authorize(actor, action, task) {
        Decision::Allow => Ok(()),
        Decision::Deny => Err(TaskError::Unauthorized(format!(
            "not authorized to {} this task",
            action
        ))),
    }
}
