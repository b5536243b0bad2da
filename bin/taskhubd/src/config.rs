//! Server-side configuration.
//!
//! Loaded from a TOML file, resolved either by name
//! (`/etc/taskhub/<name>.toml`) or by explicit path.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use taskhub_auth::service::AuthConfig;

/// Server configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    pub jwt: JwtConfig,

    pub root: RootConfig,
}

/// Storage locations.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the SQLite database.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> String {
    "/var/lib/taskhub".to_string()
}

/// JWT signing configuration. Access and refresh tokens use separate
/// secrets so one kind can never pass as the other.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,

    /// Access token TTL at login/signup (seconds).
    #[serde(default = "default_access_ttl")]
    pub access_ttl_secs: i64,

    /// Access token TTL when minted through refresh (seconds).
    #[serde(default = "default_refresh_access_ttl")]
    pub refresh_access_ttl_secs: i64,

    /// Refresh token TTL (seconds).
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_secs: i64,
}

fn default_access_ttl() -> i64 {
    900 // 15 min
}

fn default_refresh_access_ttl() -> i64 {
    60 // 1 min
}

fn default_refresh_ttl() -> i64 {
    604800 // 7 days
}

/// The bootstrap Root identity, created on first start.
#[derive(Debug, Clone, Deserialize)]
pub struct RootConfig {
    #[serde(default = "default_root_name")]
    pub name: String,

    pub email: String,

    /// Argon2id hash of the root password (never the password itself).
    pub password_hash: String,
}

fn default_root_name() -> String {
    "Root".to_string()
}

impl ServerConfig {
    /// Resolve a context name or path to a config file path.
    ///
    /// A bare name maps to `/etc/taskhub/<name>.toml`; anything with a
    /// `/` or `.` is used as a path directly.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/taskhub/{name_or_path}.toml"))
        }
    }

    /// Load config from disk.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Path of the SQLite database under the data dir.
    pub fn sqlite_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir).join("taskhub.db")
    }

    /// Derive the auth module's configuration.
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            access_secret: self.jwt.access_secret.clone(),
            refresh_secret: self.jwt.refresh_secret.clone(),
            access_ttl: self.jwt.access_ttl_secs,
            refresh_access_ttl: self.jwt.refresh_access_ttl_secs,
            refresh_ttl: self.jwt.refresh_ttl_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn resolve_name_vs_path() {
        assert_eq!(
            ServerConfig::resolve_path("prod"),
            PathBuf::from("/etc/taskhub/prod.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("./local.toml"),
            PathBuf::from("./local.toml")
        );
    }

    #[test]
    fn load_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[jwt]
access_secret = "a-secret"
refresh_secret = "r-secret"

[root]
email = "root@example.com"
password_hash = "$argon2id$hash"
"#
        )
        .unwrap();

        let config = ServerConfig::load(file.path()).unwrap();
        assert_eq!(config.jwt.access_ttl_secs, 900);
        assert_eq!(config.jwt.refresh_access_ttl_secs, 60);
        assert_eq!(config.jwt.refresh_ttl_secs, 604800);
        assert_eq!(config.storage.data_dir, "/var/lib/taskhub");
        assert_eq!(config.root.name, "Root");

        let auth = config.auth_config();
        assert_eq!(auth.access_secret, "a-secret");
        assert_eq!(auth.refresh_ttl, 604800);
    }

    #[test]
    fn load_with_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[storage]
data_dir = "/tmp/taskhub-test"

[jwt]
access_secret = "a"
refresh_secret = "r"
access_ttl_secs = 300

[root]
name = "Admin"
email = "root@example.com"
password_hash = "$argon2id$hash"
"#
        )
        .unwrap();

        let config = ServerConfig::load(file.path()).unwrap();
        assert_eq!(config.jwt.access_ttl_secs, 300);
        assert_eq!(config.root.name, "Admin");
        assert_eq!(
            config.sqlite_path(),
            PathBuf::from("/tmp/taskhub-test/taskhub.db")
        );
    }
}
