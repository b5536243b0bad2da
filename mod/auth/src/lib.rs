//! Auth module — identity store, token lifecycle, role resolution.
//!
//! # Resources
//!
//! - **User** — identity with an argon2id password hash, a role tier,
//!   and the set of task ids assigned to it
//! - **Session** — one row per issued refresh token, revocable
//!
//! # Usage
//!
//! ```ignore
//! use taskhub_auth::{AuthModule, service::AuthConfig};
//!
//! let module = AuthModule::new(sql, AuthConfig::default())?;
//! let router = module.routes(); // /auth/* and /users/*
//! ```

pub mod model;
pub mod service;
pub mod api;

use std::sync::Arc;

use axum::Router;

use taskhub_core::Module;

use crate::service::{AuthConfig, AuthService};

/// Auth module implementing the Module trait.
///
/// Holds the AuthService and provides HTTP routes for session and
/// user endpoints.
pub struct AuthModule {
    service: Arc<AuthService>,
}

impl AuthModule {
    /// Create a new AuthModule, initializing the DB schema.
    pub fn new(
        sql: Arc<dyn taskhub_sql::SQLStore>,
        config: AuthConfig,
    ) -> Result<Self, taskhub_core::ServiceError> {
        let service = AuthService::new(sql, config).map_err(taskhub_core::ServiceError::from)?;
        Ok(Self { service })
    }

    /// Get a reference to the underlying AuthService.
    pub fn service(&self) -> &Arc<AuthService> {
        &self.service
    }
}

impl Module for AuthModule {
    fn name(&self) -> &str {
        "auth"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
