use serde::{Deserialize, Serialize};

use taskhub_core::Role;

/// A user identity.
///
/// `tasks` is the identity-side half of the task assignment relation.
/// It is only ever mutated by the task module's assignment workflow,
/// in the same transaction as the task-side set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (UUIDv4, no dashes). Immutable.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Email address, unique across users. Login credential.
    pub email: String,

    /// Argon2id password hash. Never leaves the service layer —
    /// API responses use [`UserProfile`].
    pub password_hash: String,

    /// Permission tier. Defaults to `User` at signup; changed only by
    /// a Root actor through the role endpoint.
    pub role: Role,

    /// Ids of tasks this user is assigned to.
    #[serde(default)]
    pub tasks: Vec<String>,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

/// Input for `POST /auth/signup`.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Input for `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Input for `PUT /users/{id}/role`.
#[derive(Debug, Clone, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

/// The externally visible view of a user — everything except the
/// password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub tasks: Vec<String>,
    pub created_at: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            tasks: user.tasks.clone(),
            created_at: user.created_at.clone(),
        }
    }
}
