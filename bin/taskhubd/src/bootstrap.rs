//! Bootstrap — first-start checks and Root identity creation.
//!
//! When taskhubd starts:
//! 1. Verify the config carries JWT secrets and a root password hash —
//!    if not, refuse to start.
//! 2. Ensure the Root identity exists in the users table.

use std::sync::Arc;

use tracing::info;

use taskhub_auth::service::AuthService;

use crate::config::{RootConfig, ServerConfig};

/// Verify server configuration is ready for production use.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.jwt.access_secret.is_empty() || config.jwt.refresh_secret.is_empty() {
        anyhow::bail!("JWT secrets must not be empty in configuration.");
    }
    if config.root.password_hash.is_empty() {
        anyhow::bail!(
            "No root password hash found in configuration.\n\
             Generate one with an argon2id tool and set [root].password_hash."
        );
    }
    if config.root.email.is_empty() {
        anyhow::bail!("Root email is empty in configuration.");
    }
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    Ok(())
}

/// Ensure the Root identity exists. Creates it from the configured
/// hash if the email is not taken yet.
pub fn ensure_root_user(auth: &Arc<AuthService>, root: &RootConfig) -> anyhow::Result<()> {
    let created = auth
        .ensure_bootstrap_user(&root.name, &root.email, &root.password_hash)
        .map_err(|e| anyhow::anyhow!("failed to create root user: {e}"))?;

    if created {
        info!(email = %root.email, "created root user");
    } else {
        info!(email = %root.email, "root user already exists");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JwtConfig, StorageConfig};

    fn valid_config() -> ServerConfig {
        ServerConfig {
            storage: StorageConfig {
                data_dir: "/tmp".to_string(),
            },
            jwt: JwtConfig {
                access_secret: "a".to_string(),
                refresh_secret: "r".to_string(),
                access_ttl_secs: 900,
                refresh_access_ttl_secs: 60,
                refresh_ttl_secs: 604800,
            },
            root: RootConfig {
                name: "Root".to_string(),
                email: "root@example.com".to_string(),
                password_hash: "$argon2id$hash".to_string(),
            },
        }
    }

    #[test]
    fn verify_config_accepts_complete_config() {
        assert!(verify_config(&valid_config()).is_ok());
    }

    #[test]
    fn verify_config_rejects_missing_pieces() {
        let mut config = valid_config();
        config.jwt.access_secret = String::new();
        assert!(verify_config(&config).is_err());

        let mut config = valid_config();
        config.root.password_hash = String::new();
        assert!(verify_config(&config).is_err());

        let mut config = valid_config();
        config.root.email = String::new();
        assert!(verify_config(&config).is_err());

        let mut config = valid_config();
        config.storage.data_dir = String::new();
        assert!(verify_config(&config).is_err());
    }
}
