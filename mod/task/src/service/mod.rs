pub mod assign;
pub mod tasks;

use std::sync::Arc;

use thiserror::Error;

use taskhub_core::is_valid_id;
use taskhub_sql::SQLStore;

use crate::store::TaskStore;

/// Task service error type.
#[derive(Debug, Error)]
pub enum TaskError {
    /// A caller-supplied id is not a well-formed identifier. The
    /// message names the offending value.
    #[error("invalid identifier {0}")]
    InvalidIdentifier(String),

    #[error("{0} not found")]
    NotFound(String),

    /// An assignment target that does not resolve to a user.
    #[error("user {0} not found")]
    IdentityNotFound(String),

    /// Authenticated, but the authorization engine said Deny.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Validation(String),

    /// The two-sided assignment transaction did not commit; every
    /// statement was rolled back.
    #[error("assignment not committed: {0}")]
    AssignmentFailed(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<TaskError> for taskhub_core::ServiceError {
    fn from(e: TaskError) -> Self {
        let msg = e.to_string();
        match e {
            TaskError::InvalidIdentifier(_) | TaskError::Validation(_) => {
                taskhub_core::ServiceError::Validation(msg)
            }
            TaskError::NotFound(_) | TaskError::IdentityNotFound(_) => {
                taskhub_core::ServiceError::NotFound(msg)
            }
            TaskError::Unauthorized(_) => taskhub_core::ServiceError::PermissionDenied(msg),
            TaskError::AssignmentFailed(_) | TaskError::Storage(_) => {
                taskhub_core::ServiceError::Storage(msg)
            }
            TaskError::Internal(_) => taskhub_core::ServiceError::Internal(msg),
        }
    }
}

/// The Task service. Wraps the store with authorization and the
/// assignment workflow.
pub struct TaskService {
    pub(crate) store: TaskStore,
}

impl TaskService {
    /// Create a new TaskService, initializing the DB schema.
    pub fn new(sql: Arc<dyn SQLStore>) -> Result<Arc<Self>, TaskError> {
        Ok(Arc::new(Self {
            store: TaskStore::new(sql)?,
        }))
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }
}

/// Reject ids that are not well-formed before they reach the store.
pub(crate) fn ensure_id(what: &str, id: &str) -> Result<(), TaskError> {
    if !is_valid_id(id) {
        return Err(TaskError::InvalidIdentifier(format!("{what} '{id}'")));
    }
    Ok(())
}

/// Add `item` to the string-array field `key` of a JSON record,
/// preserving set semantics. Returns true if the item was added.
pub(crate) fn add_to_set(value: &mut serde_json::Value, key: &str, item: &str) -> bool {
    let arr = value
        .as_object_mut()
        .map(|obj| {
            obj.entry(key.to_string())
                .or_insert_with(|| serde_json::Value::Array(Vec::new()))
        })
        .and_then(|v| v.as_array_mut());

    match arr {
        Some(arr) => {
            if arr.iter().any(|v| v.as_str() == Some(item)) {
                false
            } else {
                arr.push(serde_json::Value::String(item.to_string()));
                true
            }
        }
        None => false,
    }
}

/// Remove `item` from the string-array field `key` of a JSON record.
/// Returns true if the item was present.
pub(crate) fn remove_from_set(value: &mut serde_json::Value, key: &str, item: &str) -> bool {
    match value.get_mut(key).and_then(|v| v.as_array_mut()) {
        Some(arr) => {
            let before = arr.len();
            arr.retain(|v| v.as_str() != Some(item));
            arr.len() < before
        }
        None => false,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use taskhub_core::{new_id, now_rfc3339, Actor, Role};
    use taskhub_sql::{SQLStore, SqliteStore, Value};

    use super::TaskService;

    /// In production the auth module owns the `users` table; tests
    /// recreate the columns the task queries touch.
    pub fn test_service() -> (Arc<dyn SQLStore>, Arc<TaskService>) {
        let sql: Arc<dyn SQLStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        sql.exec_batch(
            "CREATE TABLE users (
                id TEXT PRIMARY KEY, data TEXT NOT NULL, name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE, role TEXT NOT NULL, created_at TEXT NOT NULL
            );",
        )
        .unwrap();
        let svc = TaskService::new(sql.clone()).unwrap();
        (sql, svc)
    }

    /// Insert a user row the way the auth module would and return the
    /// matching request actor.
    pub fn seed_user(svc: &TaskService, name: &str, role: Role) -> Actor {
        let id = new_id();
        let now = now_rfc3339();
        let email = format!("{}@example.com", name.to_lowercase());
        let data = serde_json::json!({
            "id": id,
            "name": name,
            "email": email,
            "password_hash": "",
            "role": role,
            "tasks": [],
            "created_at": now,
            "updated_at": now,
        });

        svc.store()
            .db()
            .exec(
                "INSERT INTO users (id, data, name, email, role, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                &[
                    Value::Text(id.clone()),
                    Value::Text(data.to_string()),
                    Value::Text(name.to_string()),
                    Value::Text(email),
                    Value::Text(role.as_str().to_string()),
                    Value::Text(now),
                ],
            )
            .unwrap();

        Actor::new(id, role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_id_names_the_offender() {
        assert!(ensure_id("task id", "0123456789abcdef0123456789abcdef").is_ok());
        let err = ensure_id("user id", "nope").unwrap_err();
        assert!(matches!(err, TaskError::InvalidIdentifier(_)));
        assert!(err.to_string().contains("'nope'"));
    }

    #[test]
    fn set_helpers_collapse_duplicates() {
        let mut user = serde_json::json!({"id": "u1", "tasks": ["t1"]});

        assert!(add_to_set(&mut user, "tasks", "t2"));
        assert!(!add_to_set(&mut user, "tasks", "t2"));
        assert_eq!(user["tasks"], serde_json::json!(["t1", "t2"]));

        assert!(remove_from_set(&mut user, "tasks", "t1"));
        assert!(!remove_from_set(&mut user, "tasks", "t1"));
        assert_eq!(user["tasks"], serde_json::json!(["t2"]));
    }

    #[test]
    fn set_helpers_create_missing_array() {
        let mut user = serde_json::json!({"id": "u1"});
        assert!(add_to_set(&mut user, "tasks", "t1"));
        assert_eq!(user["tasks"], serde_json::json!(["t1"]));

        let mut bare = serde_json::json!({"id": "u2"});
        assert!(!remove_from_set(&mut bare, "tasks", "t1"));
    }
}
