use taskhub_core::{new_id, now_rfc3339, Role};
use taskhub_sql::Value;

use crate::model::{SignupRequest, User};
use crate::service::{validate, AuthError, AuthService};

impl AuthService {
    /// Create a new user from signup input. The role is always `User`;
    /// promotion happens separately through [`AuthService::set_role`].
    pub fn signup(&self, input: SignupRequest) -> Result<User, AuthError> {
        validate::require("name", &input.name)?;
        validate::validate_email(&input.email)?;
        validate::validate_password(&input.password)?;

        if self.find_by_email(&input.email)?.is_some() {
            return Err(AuthError::Conflict(format!(
                "email '{}' is already in use",
                input.email
            )));
        }

        let now = now_rfc3339();
        let user = User {
            id: new_id(),
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            password_hash: hash_password(&input.password)?,
            role: Role::User,
            tasks: Vec::new(),
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record(
            "users",
            &user.id,
            &user,
            &[
                ("name", Value::Text(user.name.clone())),
                ("email", Value::Text(user.email.clone())),
                ("role", Value::Text(user.role.as_str().to_string())),
                ("created_at", Value::Text(now)),
            ],
        )?;

        tracing::info!(user_id = %user.id, "user signed up");
        Ok(user)
    }

    /// Verify login credentials and return the user.
    ///
    /// Unknown email and wrong password both map to the same
    /// `InvalidCredentials` error, so responses don't reveal which
    /// emails exist.
    pub fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .find_by_email(email)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Get a user by id.
    pub fn get_user(&self, id: &str) -> Result<User, AuthError> {
        self.get_record("users", id)
    }

    /// Resolve an identity to its role tier.
    ///
    /// A missing identity is an authentication failure (the token's
    /// subject no longer exists), not an authorization one.
    pub fn resolve_role(&self, id: &str) -> Result<Role, AuthError> {
        let user: User = self
            .get_record("users", id)
            .map_err(|_| AuthError::IdentityNotFound(id.to_string()))?;
        Ok(user.role)
    }

    /// List all users, newest first.
    pub fn list_users(&self) -> Result<Vec<User>, AuthError> {
        let rows = self
            .sql
            .query("SELECT data FROM users ORDER BY created_at DESC", &[])
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        let mut users = Vec::new();
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| AuthError::Internal("missing data column".into()))?;
            let user: User =
                serde_json::from_str(data).map_err(|e| AuthError::Internal(e.to_string()))?;
            users.push(user);
        }
        Ok(users)
    }

    /// Change a user's role. Gating (Root only) happens at the API layer.
    pub fn set_role(&self, id: &str, role: Role) -> Result<User, AuthError> {
        let mut user: User = self.get_record("users", id)?;
        user.role = role;
        user.updated_at = now_rfc3339();

        self.update_record(
            "users",
            id,
            &user,
            &[("role", Value::Text(role.as_str().to_string()))],
        )?;

        tracing::info!(user_id = %id, role = %role, "role changed");
        Ok(user)
    }

    /// Find a user by email via the indexed column.
    pub fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM users WHERE email = ?1",
                &[Value::Text(email.trim().to_string())],
            )
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        match rows.first().and_then(|r| r.get_str("data")) {
            Some(data) => {
                let user: User =
                    serde_json::from_str(data).map_err(|e| AuthError::Internal(e.to_string()))?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    /// First-start bootstrap: create the Root identity from a
    /// pre-computed password hash if no user owns the email yet.
    /// Returns true if the user was created.
    pub fn ensure_bootstrap_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<bool, AuthError> {
        if self.find_by_email(email)?.is_some() {
            return Ok(false);
        }

        let now = now_rfc3339();
        let user = User {
            id: new_id(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role: Role::Root,
            tasks: Vec::new(),
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record(
            "users",
            &user.id,
            &user,
            &[
                ("name", Value::Text(user.name.clone())),
                ("email", Value::Text(user.email.clone())),
                ("role", Value::Text(user.role.as_str().to_string())),
                ("created_at", Value::Text(now)),
            ],
        )?;

        tracing::info!(user_id = %user.id, "bootstrap root user created");
        Ok(true)
    }
}

/// Hash a password with argon2id and a fresh random salt.
fn hash_password(password: &str) -> Result<String, AuthError> {
    use argon2::Argon2;
    use password_hash::rand_core::OsRng;
    use password_hash::{PasswordHasher, SaltString};

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Internal(format!("password hash: {e}")))
}

/// Verify a password attempt against a stored argon2id hash.
fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::Argon2;
    use password_hash::{PasswordHash, PasswordVerifier};

    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
