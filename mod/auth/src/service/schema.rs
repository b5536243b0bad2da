use taskhub_sql::SQLStore;

use crate::service::AuthError;

/// SQL schema for the auth module.
///
/// Records live in the JSON `data` column; the scalar columns exist for
/// lookups and uniqueness (email) only.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id          TEXT PRIMARY KEY,
    data        TEXT NOT NULL,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL UNIQUE,
    role        TEXT NOT NULL,
    created_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_users_role ON users(role);
CREATE INDEX IF NOT EXISTS idx_users_created_at ON users(created_at);

CREATE TABLE IF NOT EXISTS sessions (
    id          TEXT PRIMARY KEY,
    data        TEXT NOT NULL,
    user_id     TEXT NOT NULL,
    revoked     INTEGER NOT NULL DEFAULT 0,
    issued_at   TEXT NOT NULL,
    expires_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
";

/// Initialize the auth tables.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), AuthError> {
    sql.exec_batch(SCHEMA)
        .map_err(|e| AuthError::Storage(format!("auth schema init: {e}")))
}
