pub mod schema;
pub mod token;
pub mod user;
pub mod validate;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use taskhub_sql::{SQLStore, Value};

/// Auth service error type.
///
/// The token/credential variants all collapse to 401 UNAUTHENTICATED at
/// the boundary; they stay separate here because tests and logs care
/// about which step failed.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("token expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("identity not found: {0}")]
    IdentityNotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<AuthError> for taskhub_core::ServiceError {
    fn from(e: AuthError) -> Self {
        let msg = e.to_string();
        match e {
            AuthError::NotFound(_) => taskhub_core::ServiceError::NotFound(msg),
            AuthError::Conflict(_) => taskhub_core::ServiceError::Conflict(msg),
            AuthError::Validation(_) => taskhub_core::ServiceError::Validation(msg),
            AuthError::InvalidCredentials
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_)
            | AuthError::SessionNotFound(_)
            | AuthError::IdentityNotFound(_) => taskhub_core::ServiceError::Unauthorized(msg),
            AuthError::Forbidden(_) => taskhub_core::ServiceError::PermissionDenied(msg),
            AuthError::Storage(_) => taskhub_core::ServiceError::Storage(msg),
            AuthError::Internal(_) => taskhub_core::ServiceError::Internal(msg),
        }
    }
}

/// Configuration for the auth service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Signing secret for access tokens.
    pub access_secret: String,
    /// Signing secret for refresh tokens.
    pub refresh_secret: String,
    /// Access token lifetime at login/signup, in seconds (default: 15 min).
    pub access_ttl: i64,
    /// Access token lifetime when minted through refresh, in seconds
    /// (default: 1 min — the silently-refreshed window is deliberately
    /// much shorter than the login one).
    pub refresh_access_ttl: i64,
    /// Refresh token lifetime in seconds (default: 7 days).
    pub refresh_ttl: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: "taskhub-dev-access-secret-change-me".to_string(),
            refresh_secret: "taskhub-dev-refresh-secret-change-me".to_string(),
            access_ttl: 900,        // 15 min
            refresh_access_ttl: 60, // 1 min
            refresh_ttl: 604800,    // 7 days
        }
    }
}

/// The Auth service. Holds the storage backend and configuration.
pub struct AuthService {
    pub(crate) sql: Arc<dyn SQLStore>,
    pub(crate) config: AuthConfig,
}

impl AuthService {
    /// Create a new AuthService, initializing the DB schema.
    pub fn new(sql: Arc<dyn SQLStore>, config: AuthConfig) -> Result<Arc<Self>, AuthError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Arc::new(Self { sql, config }))
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    // ── Generic CRUD helpers ──

    /// Insert a record as JSON into a table with indexed columns.
    pub(crate) fn insert_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), AuthError> {
        let json =
            serde_json::to_string(record).map_err(|e| AuthError::Internal(e.to_string()))?;

        let mut cols = vec!["id", "data"];
        let mut placeholders = vec!["?1".to_string(), "?2".to_string()];
        let mut params = vec![Value::Text(id.to_string()), Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            let idx = i + 3;
            cols.push(*col);
            placeholders.push(format!("?{}", idx));
            params.push(val.clone());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            cols.join(", "),
            placeholders.join(", "),
        );

        self.sql.exec(&sql, &params).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE constraint") {
                AuthError::Conflict(msg)
            } else {
                AuthError::Storage(msg)
            }
        })?;

        Ok(())
    }

    /// Get a record by id, deserializing the JSON `data` column.
    pub(crate) fn get_record<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<T, AuthError> {
        let sql = format!("SELECT data FROM {} WHERE id = ?1", table);
        let rows = self
            .sql
            .query(&sql, &[Value::Text(id.to_string())])
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| AuthError::NotFound(format!("{}/{}", table, id)))?;
        let data = row
            .get_str("data")
            .ok_or_else(|| AuthError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Update a record's JSON data and indexed columns.
    pub(crate) fn update_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), AuthError> {
        let json =
            serde_json::to_string(record).map_err(|e| AuthError::Internal(e.to_string()))?;

        let mut sets = vec!["data = ?1".to_string()];
        let mut params: Vec<Value> = vec![Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            let idx = i + 2;
            sets.push(format!("{} = ?{}", col, idx));
            params.push(val.clone());
        }

        let id_idx = params.len() + 1;
        params.push(Value::Text(id.to_string()));

        let sql = format!("UPDATE {} SET {} WHERE id = ?{}", table, sets.join(", "), id_idx);

        let affected = self
            .sql
            .exec(&sql, &params)
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(AuthError::NotFound(format!("{}/{}", table, id)));
        }

        Ok(())
    }
}
