use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Task — the core data model
// ---------------------------------------------------------------------------

/// A task record.
///
/// `created_by` is set once at creation and never reassigned — it is
/// the ownership anchor every mutation rule hangs off. `assigned_to`
/// is a set (no duplicate ids) and is only ever written by the
/// assignment workflow, together with the matching user-side sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    pub title: String,

    pub description: String,

    /// Owner: the identity that created this task. Immutable.
    pub created_by: String,

    /// Ids of users assigned to this task.
    #[serde(default)]
    pub assigned_to: Vec<String>,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

// ---------------------------------------------------------------------------
// API request / response types
// ---------------------------------------------------------------------------

/// Body for `POST /tasks`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: String,
}

/// Body for `POST /tasks/{id}/assignees`.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignRequest {
    pub user_ids: Vec<String>,
}

/// An assignee resolved to a displayable pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssigneeRef {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_json_roundtrip() {
        let task = Task {
            id: "abc123".into(),
            title: "Ship the release".into(),
            description: "Cut, tag, upload".into(),
            created_by: "admin-1".into(),
            assigned_to: vec!["u1".into(), "u2".into()],
            created_at: "2026-01-01T00:00:00Z".into(),
            updated_at: "2026-01-02T00:00:00Z".into(),
        };
        let json = serde_json::to_string(&task).unwrap();
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "abc123");
        assert_eq!(back.created_by, "admin-1");
        assert_eq!(back.assigned_to, vec!["u1", "u2"]);
    }

    #[test]
    fn assigned_to_defaults_to_empty() {
        let json = r#"{
            "id": "t1",
            "title": "x",
            "description": "y",
            "created_by": "a",
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.assigned_to.is_empty());
    }

    #[test]
    fn assign_request_deserialize() {
        let json = r#"{"user_ids":["u1","u2"]}"#;
        let req: AssignRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.user_ids.len(), 2);
    }
}
