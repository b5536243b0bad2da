mod session;
mod users;

use std::sync::Arc;

use axum::Router;

use crate::service::AuthService;

/// Shared application state for auth handlers.
pub type AppState = Arc<AuthService>;

/// Build the auth API router.
///
/// Paths are absolute (`/auth/...`, `/users/...`); the binary merges
/// them as-is and layers the bearer middleware on top. The session
/// endpoints are on the middleware's public list — everything else
/// requires an authenticated [`taskhub_core::Actor`].
pub fn build_router(svc: Arc<AuthService>) -> Router {
    Router::new()
        .merge(session::routes())
        .merge(users::routes())
        .with_state(svc)
}
