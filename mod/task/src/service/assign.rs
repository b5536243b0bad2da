//! The two-sided assignment workflow.
//!
//! Every assignment touches three places: the task's `assigned_to`
//! set, each affected user's `tasks` set, and the `task_assignees`
//! index. All three are written in a single transaction — a partial
//! commit would silently break the bidirectional invariant.

use taskhub_core::{now_rfc3339, Actor};

use crate::authz::{ensure_allowed, TaskAction};
use crate::model::AssigneeRef;
use crate::service::{add_to_set, ensure_id, remove_from_set, TaskError, TaskService};
use crate::store;

impl TaskService {
    /// Assign users to a task. Duplicates collapse; users already
    /// assigned are no-ops. Returns the task's assignees resolved to
    /// `{id, name}` pairs.
    pub fn assign_users(
        &self,
        actor: &Actor,
        task_id: &str,
        user_ids: &[String],
    ) -> Result<Vec<AssigneeRef>, TaskError> {
        ensure_id("task id", task_id)?;
        for user_id in user_ids {
            ensure_id("user id", user_id)?;
        }

        let mut task = self.store.get(task_id)?;
        ensure_allowed(actor, TaskAction::Assign, Some(&task))?;

        let mut stmts = Vec::new();
        let mut seen: Vec<&str> = Vec::new();
        for user_id in user_ids {
            if seen.contains(&user_id.as_str()) {
                continue;
            }
            seen.push(user_id.as_str());

            if task.assigned_to.contains(user_id) {
                continue;
            }

            let mut user = self
                .store
                .load_user_value(user_id)?
                .ok_or_else(|| TaskError::IdentityNotFound(user_id.clone()))?;

            add_to_set(&mut user, "tasks", task_id);
            stmts.push(store::stmt_update_user_data(user_id, &user)?);
            stmts.push(store::stmt_add_assignee(task_id, user_id));
            task.assigned_to.push(user_id.clone());
        }

        if !stmts.is_empty() {
            task.updated_at = now_rfc3339();
            stmts.insert(0, store::stmt_update_task_data(&task)?);

            self.store
                .apply(&stmts)
                .map_err(|e| TaskError::AssignmentFailed(e.to_string()))?;

            tracing::info!(task_id = %task_id, count = seen.len(), "users assigned");
        }

        self.store.assignees(task_id)
    }

    /// Remove a user from a task — the inverse of [`assign_users`],
    /// same authorization gate, idempotent when the user is not
    /// assigned.
    ///
    /// [`assign_users`]: TaskService::assign_users
    pub fn unassign_user(
        &self,
        actor: &Actor,
        task_id: &str,
        user_id: &str,
    ) -> Result<Vec<AssigneeRef>, TaskError> {
        ensure_id("task id", task_id)?;
        ensure_id("user id", user_id)?;

        let mut task = self.store.get(task_id)?;
        ensure_allowed(actor, TaskAction::Unassign, Some(&task))?;

        if task.assigned_to.iter().any(|u| u == user_id) {
            task.assigned_to.retain(|u| u != user_id);
            task.updated_at = now_rfc3339();

            let mut stmts = vec![store::stmt_update_task_data(&task)?];
            if let Some(mut user) = self.store.load_user_value(user_id)? {
                remove_from_set(&mut user, "tasks", task_id);
                stmts.push(store::stmt_update_user_data(user_id, &user)?);
            }
            stmts.push(store::stmt_remove_assignee(task_id, user_id));

            self.store
                .apply(&stmts)
                .map_err(|e| TaskError::AssignmentFailed(e.to_string()))?;

            tracing::info!(task_id = %task_id, user_id = %user_id, "user unassigned");
        }

        self.store.assignees(task_id)
    }

    /// The task's current assignees as `{id, name}` pairs.
    pub fn get_assignees(&self, actor: &Actor, task_id: &str) -> Result<Vec<AssigneeRef>, TaskError> {
        ensure_id("task id", task_id)?;
        let task = self.store.get(task_id)?;
        ensure_allowed(actor, TaskAction::Read, Some(&task))?;
        self.store.assignees(&task.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CreateTaskRequest;
    use crate::service::test_support::{seed_user, test_service};
    use taskhub_core::Role;
    use taskhub_sql::{SQLStore, Value};

    fn make_task(svc: &TaskService, owner: &Actor) -> String {
        svc.create_task(
            owner,
            CreateTaskRequest {
                title: "T".into(),
                description: "d".into(),
            },
        )
        .unwrap()
        .id
    }

    fn user_tasks(sql: &dyn SQLStore, user_id: &str) -> serde_json::Value {
        let rows = sql
            .query(
                "SELECT data FROM users WHERE id = ?1",
                &[Value::Text(user_id.to_string())],
            )
            .unwrap();
        let value: serde_json::Value =
            serde_json::from_str(rows[0].get_str("data").unwrap()).unwrap();
        value["tasks"].clone()
    }

    #[test]
    fn assignment_is_bidirectional() {
        let (sql, svc) = test_service();
        let admin = seed_user(&svc, "Ada", Role::Admin);
        let u1 = seed_user(&svc, "Uma", Role::User);
        let u2 = seed_user(&svc, "Ben", Role::User);
        let task_id = make_task(&svc, &admin);

        let refs = svc
            .assign_users(&admin, &task_id, &[u1.id.clone(), u2.id.clone()])
            .unwrap();

        // Task side, resolved with names (sorted by name).
        let names: Vec<&str> = refs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Ben", "Uma"]);

        // Task record carries the set.
        let task = svc.get_task(&admin, &task_id).unwrap();
        assert!(task.assigned_to.contains(&u1.id));
        assert!(task.assigned_to.contains(&u2.id));

        // User side mentions the task immediately.
        assert_eq!(user_tasks(sql.as_ref(), &u1.id), serde_json::json!([task_id.clone()]));
        assert_eq!(user_tasks(sql.as_ref(), &u2.id), serde_json::json!([task_id.clone()]));
    }

    #[test]
    fn reassigning_collapses_duplicates() {
        let (sql, svc) = test_service();
        let admin = seed_user(&svc, "Ada", Role::Admin);
        let u1 = seed_user(&svc, "Uma", Role::User);
        let u2 = seed_user(&svc, "Ben", Role::User);
        let task_id = make_task(&svc, &admin);

        svc.assign_users(&admin, &task_id, &[u1.id.clone()]).unwrap();

        // U1 again (twice in one request, even) plus U2 → exactly {U1, U2}.
        let refs = svc
            .assign_users(&admin, &task_id, &[u1.id.clone(), u1.id.clone(), u2.id.clone()])
            .unwrap();
        assert_eq!(refs.len(), 2);

        let task = svc.get_task(&admin, &task_id).unwrap();
        assert_eq!(task.assigned_to.len(), 2);

        // One copy on the user side too.
        assert_eq!(user_tasks(sql.as_ref(), &u1.id), serde_json::json!([task_id]));
    }

    #[test]
    fn malformed_ids_are_named() {
        let (_sql, svc) = test_service();
        let admin = seed_user(&svc, "Ada", Role::Admin);
        let task_id = make_task(&svc, &admin);

        let err = svc
            .assign_users(&admin, "not-a-task-id", &[])
            .unwrap_err();
        assert!(matches!(err, TaskError::InvalidIdentifier(_)));
        assert!(err.to_string().contains("'not-a-task-id'"));

        let err = svc
            .assign_users(&admin, &task_id, &["bogus!".to_string()])
            .unwrap_err();
        assert!(err.to_string().contains("'bogus!'"));
    }

    #[test]
    fn unknown_user_fails_before_any_write() {
        let (sql, svc) = test_service();
        let admin = seed_user(&svc, "Ada", Role::Admin);
        let u1 = seed_user(&svc, "Uma", Role::User);
        let task_id = make_task(&svc, &admin);

        let ghost = taskhub_core::new_id();
        let err = svc
            .assign_users(&admin, &task_id, &[u1.id.clone(), ghost.clone()])
            .unwrap_err();
        assert!(matches!(err, TaskError::IdentityNotFound(_)));

        // Nothing committed — not even the valid half of the request.
        let task = svc.get_task(&admin, &task_id).unwrap();
        assert!(task.assigned_to.is_empty());
        assert_eq!(user_tasks(sql.as_ref(), &u1.id), serde_json::json!([]));
    }

    #[test]
    fn assignment_gate_matches_mutation_rule() {
        let (_sql, svc) = test_service();
        let admin_x = seed_user(&svc, "Xavier", Role::Admin);
        let admin_y = seed_user(&svc, "Yun", Role::Admin);
        let root = seed_user(&svc, "Rhea", Role::Root);
        let user = seed_user(&svc, "Uma", Role::User);
        let task_id = make_task(&svc, &admin_x);

        // Peer admin and plain user are denied.
        assert!(matches!(
            svc.assign_users(&admin_y, &task_id, &[user.id.clone()]),
            Err(TaskError::Unauthorized(_))
        ));
        assert!(matches!(
            svc.assign_users(&user, &task_id, &[user.id.clone()]),
            Err(TaskError::Unauthorized(_))
        ));

        // Root assigns on anyone's task.
        let refs = svc.assign_users(&root, &task_id, &[user.id.clone()]).unwrap();
        assert_eq!(refs.len(), 1);

        // Unassign has the same gate.
        assert!(matches!(
            svc.unassign_user(&admin_y, &task_id, &user.id),
            Err(TaskError::Unauthorized(_))
        ));
    }

    #[test]
    fn unassign_is_inverse_and_idempotent() {
        let (sql, svc) = test_service();
        let admin = seed_user(&svc, "Ada", Role::Admin);
        let u1 = seed_user(&svc, "Uma", Role::User);
        let task_id = make_task(&svc, &admin);

        svc.assign_users(&admin, &task_id, &[u1.id.clone()]).unwrap();

        let refs = svc.unassign_user(&admin, &task_id, &u1.id).unwrap();
        assert!(refs.is_empty());

        let task = svc.get_task(&admin, &task_id).unwrap();
        assert!(task.assigned_to.is_empty());
        assert_eq!(user_tasks(sql.as_ref(), &u1.id), serde_json::json!([]));

        // Repeating the unassign changes nothing and still succeeds.
        let refs = svc.unassign_user(&admin, &task_id, &u1.id).unwrap();
        assert!(refs.is_empty());
    }

    #[test]
    fn missing_task_is_not_found() {
        let (_sql, svc) = test_service();
        let admin = seed_user(&svc, "Ada", Role::Admin);
        let user = seed_user(&svc, "Uma", Role::User);

        let ghost = taskhub_core::new_id();
        assert!(matches!(
            svc.assign_users(&admin, &ghost, &[user.id.clone()]),
            Err(TaskError::NotFound(_))
        ));
    }

    #[test]
    fn assignees_visible_to_any_authenticated_actor() {
        let (_sql, svc) = test_service();
        let admin = seed_user(&svc, "Ada", Role::Admin);
        let u1 = seed_user(&svc, "Uma", Role::User);
        let outsider = seed_user(&svc, "Omar", Role::User);
        let task_id = make_task(&svc, &admin);

        svc.assign_users(&admin, &task_id, &[u1.id.clone()]).unwrap();

        let refs = svc.get_assignees(&outsider, &task_id).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].id, u1.id);
        assert_eq!(refs[0].name, "Uma");
    }
}
