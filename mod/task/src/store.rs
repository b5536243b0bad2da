use std::sync::Arc;

use taskhub_sql::{Row, SQLError, SQLStore, Statement, Value};

use crate::model::{AssigneeRef, Task};
use crate::service::TaskError;

/// SQL schema for the task module.
///
/// `task_assignees` is the indexed projection of the assignment
/// relation — always written in the same transaction as the two JSON
/// sides, and what the per-user list query joins against.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tasks (
    id          TEXT PRIMARY KEY,
    data        TEXT NOT NULL,
    created_by  TEXT NOT NULL,
    created_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tasks_created_by ON tasks(created_by);
CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at);

CREATE TABLE IF NOT EXISTS task_assignees (
    task_id     TEXT NOT NULL,
    user_id     TEXT NOT NULL,
    PRIMARY KEY (task_id, user_id)
);
CREATE INDEX IF NOT EXISTS idx_task_assignees_user ON task_assignees(user_id);
";

/// Persistent storage for tasks, backed by SQLStore (SQLite).
pub struct TaskStore {
    db: Arc<dyn SQLStore>,
}

impl TaskStore {
    /// Create a new TaskStore and initialise the schema.
    pub fn new(db: Arc<dyn SQLStore>) -> Result<Self, TaskError> {
        db.exec_batch(SCHEMA)
            .map_err(|e| TaskError::Storage(format!("task schema init: {e}")))?;
        Ok(Self { db })
    }

    // -----------------------------------------------------------------------
    // CRUD
    // -----------------------------------------------------------------------

    /// Insert a new task.
    pub fn insert(&self, task: &Task) -> Result<(), TaskError> {
        let data =
            serde_json::to_string(task).map_err(|e| TaskError::Internal(e.to_string()))?;

        self.db
            .exec(
                "INSERT INTO tasks (id, data, created_by, created_at) VALUES (?1, ?2, ?3, ?4)",
                &[
                    Value::Text(task.id.clone()),
                    Value::Text(data),
                    Value::Text(task.created_by.clone()),
                    Value::Text(task.created_at.clone()),
                ],
            )
            .map_err(|e| TaskError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Get a task by id.
    pub fn get(&self, id: &str) -> Result<Task, TaskError> {
        let rows = self
            .db
            .query(
                "SELECT data FROM tasks WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| TaskError::Storage(e.to_string()))?;

        let row = rows
            .first()
            .ok_or_else(|| TaskError::NotFound(format!("task {id}")))?;

        row_to_task(row)
    }

    /// Rewrite a task's JSON data column.
    pub fn update_data(&self, task: &Task) -> Result<(), TaskError> {
        let affected = self
            .db
            .exec(
                "UPDATE tasks SET data = ?1 WHERE id = ?2",
                &[
                    Value::Text(
                        serde_json::to_string(task)
                            .map_err(|e| TaskError::Internal(e.to_string()))?,
                    ),
                    Value::Text(task.id.clone()),
                ],
            )
            .map_err(|e| TaskError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(TaskError::NotFound(format!("task {}", task.id)));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Query routing
    // -----------------------------------------------------------------------

    /// All tasks, newest first. Root's view.
    pub fn list_all(&self) -> Result<Vec<Task>, TaskError> {
        let rows = self
            .db
            .query("SELECT data FROM tasks ORDER BY created_at DESC", &[])
            .map_err(|e| TaskError::Storage(e.to_string()))?;
        rows.iter().map(row_to_task).collect()
    }

    /// Tasks owned by a user, newest first. An Admin's view.
    pub fn list_created_by(&self, user_id: &str) -> Result<Vec<Task>, TaskError> {
        let rows = self
            .db
            .query(
                "SELECT data FROM tasks WHERE created_by = ?1 ORDER BY created_at DESC",
                &[Value::Text(user_id.to_string())],
            )
            .map_err(|e| TaskError::Storage(e.to_string()))?;
        rows.iter().map(row_to_task).collect()
    }

    /// Tasks a user is assigned to, newest first. A plain user's view.
    pub fn list_assigned_to(&self, user_id: &str) -> Result<Vec<Task>, TaskError> {
        let rows = self
            .db
            .query(
                "SELECT t.data AS data FROM tasks t \
                 JOIN task_assignees a ON a.task_id = t.id \
                 WHERE a.user_id = ?1 ORDER BY t.created_at DESC",
                &[Value::Text(user_id.to_string())],
            )
            .map_err(|e| TaskError::Storage(e.to_string()))?;
        rows.iter().map(row_to_task).collect()
    }

    // -----------------------------------------------------------------------
    // Assignment support
    // -----------------------------------------------------------------------

    /// Resolve a task's assignees to `{id, name}` pairs.
    pub fn assignees(&self, task_id: &str) -> Result<Vec<AssigneeRef>, TaskError> {
        let rows = self
            .db
            .query(
                "SELECT u.id AS id, u.name AS name FROM task_assignees a \
                 JOIN users u ON u.id = a.user_id \
                 WHERE a.task_id = ?1 ORDER BY u.name ASC",
                &[Value::Text(task_id.to_string())],
            )
            .map_err(|e| TaskError::Storage(e.to_string()))?;

        let mut refs = Vec::new();
        for row in &rows {
            let id = row
                .get_str("id")
                .ok_or_else(|| TaskError::Storage("missing id column".into()))?;
            let name = row
                .get_str("name")
                .ok_or_else(|| TaskError::Storage("missing name column".into()))?;
            refs.push(AssigneeRef {
                id: id.to_string(),
                name: name.to_string(),
            });
        }
        Ok(refs)
    }

    /// Load a user's full JSON record, or None if the id is unknown.
    ///
    /// The task module edits only the `tasks` array inside the value;
    /// working on the raw JSON keeps every auth-owned field intact.
    pub fn load_user_value(&self, user_id: &str) -> Result<Option<serde_json::Value>, TaskError> {
        let rows = self
            .db
            .query(
                "SELECT data FROM users WHERE id = ?1",
                &[Value::Text(user_id.to_string())],
            )
            .map_err(|e| TaskError::Storage(e.to_string()))?;

        match rows.first().and_then(|r| r.get_str("data")) {
            Some(data) => {
                let value =
                    serde_json::from_str(data).map_err(|e| TaskError::Internal(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Run statements atomically. Used for every write that touches
    /// both sides of the assignment relation.
    pub fn apply(&self, stmts: &[Statement]) -> Result<u64, SQLError> {
        self.db.exec_transaction(stmts)
    }

    #[cfg(test)]
    pub(crate) fn db(&self) -> &Arc<dyn SQLStore> {
        &self.db
    }
}

// ---------------------------------------------------------------------------
// Statement builders for transactional writes
// ---------------------------------------------------------------------------

pub fn stmt_update_task_data(task: &Task) -> Result<Statement, TaskError> {
    let data = serde_json::to_string(task).map_err(|e| TaskError::Internal(e.to_string()))?;
    Ok(Statement::new(
        "UPDATE tasks SET data = ?1 WHERE id = ?2",
        vec![Value::Text(data), Value::Text(task.id.clone())],
    ))
}

pub fn stmt_update_user_data(user_id: &str, value: &serde_json::Value) -> Result<Statement, TaskError> {
    let data = serde_json::to_string(value).map_err(|e| TaskError::Internal(e.to_string()))?;
    Ok(Statement::new(
        "UPDATE users SET data = ?1 WHERE id = ?2",
        vec![Value::Text(data), Value::Text(user_id.to_string())],
    ))
}

pub fn stmt_add_assignee(task_id: &str, user_id: &str) -> Statement {
    Statement::new(
        "INSERT OR IGNORE INTO task_assignees (task_id, user_id) VALUES (?1, ?2)",
        vec![
            Value::Text(task_id.to_string()),
            Value::Text(user_id.to_string()),
        ],
    )
}

pub fn stmt_remove_assignee(task_id: &str, user_id: &str) -> Statement {
    Statement::new(
        "DELETE FROM task_assignees WHERE task_id = ?1 AND user_id = ?2",
        vec![
            Value::Text(task_id.to_string()),
            Value::Text(user_id.to_string()),
        ],
    )
}

pub fn stmt_clear_assignees(task_id: &str) -> Statement {
    Statement::new(
        "DELETE FROM task_assignees WHERE task_id = ?1",
        vec![Value::Text(task_id.to_string())],
    )
}

pub fn stmt_delete_task(task_id: &str) -> Statement {
    Statement::new(
        "DELETE FROM tasks WHERE id = ?1",
        vec![Value::Text(task_id.to_string())],
    )
}

/// Deserialize a Task from a row's `data` JSON column.
fn row_to_task(row: &Row) -> Result<Task, TaskError> {
    let json = row
        .get_str("data")
        .ok_or_else(|| TaskError::Storage("missing data column".into()))?;
    serde_json::from_str(json).map_err(|e| TaskError::Storage(format!("bad task json: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskhub_sql::SqliteStore;

    fn test_store() -> TaskStore {
        let db: Arc<dyn SQLStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        db.exec_batch(
            "CREATE TABLE users (
                id TEXT PRIMARY KEY, data TEXT NOT NULL, name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE, role TEXT NOT NULL, created_at TEXT NOT NULL
            );",
        )
        .unwrap();
        TaskStore::new(db).unwrap()
    }

    fn make_task(id: &str, owner: &str, created_at: &str) -> Task {
        Task {
            id: id.into(),
            title: format!("task {id}"),
            description: "desc".into(),
            created_by: owner.into(),
            assigned_to: Vec::new(),
            created_at: created_at.into(),
            updated_at: created_at.into(),
        }
    }

    #[test]
    fn insert_and_get() {
        let store = test_store();
        store
            .insert(&make_task("t1", "a1", "2026-01-01T00:00:00Z"))
            .unwrap();

        let got = store.get("t1").unwrap();
        assert_eq!(got.id, "t1");
        assert_eq!(got.created_by, "a1");

        assert!(matches!(store.get("missing"), Err(TaskError::NotFound(_))));
    }

    #[test]
    fn lists_are_newest_first() {
        let store = test_store();
        store
            .insert(&make_task("old", "a1", "2026-01-01T00:00:00Z"))
            .unwrap();
        store
            .insert(&make_task("new", "a1", "2026-02-01T00:00:00Z"))
            .unwrap();
        store
            .insert(&make_task("other", "a2", "2026-03-01T00:00:00Z"))
            .unwrap();

        let all = store.list_all().unwrap();
        assert_eq!(
            all.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
            vec!["other", "new", "old"]
        );

        let owned = store.list_created_by("a1").unwrap();
        assert_eq!(
            owned.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
            vec!["new", "old"]
        );
    }

    #[test]
    fn update_data_rewrites_record() {
        let store = test_store();
        let mut task = make_task("t1", "a1", "2026-01-01T00:00:00Z");
        store.insert(&task).unwrap();

        task.title = "renamed".into();
        store.update_data(&task).unwrap();
        assert_eq!(store.get("t1").unwrap().title, "renamed");

        let ghost = make_task("ghost", "a1", "2026-01-01T00:00:00Z");
        assert!(matches!(
            store.update_data(&ghost),
            Err(TaskError::NotFound(_))
        ));
    }
}
