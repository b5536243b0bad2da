//! Bearer-token authentication middleware.
//!
//! Verifies the access token, resolves the caller's role, and injects
//! an [`Actor`] into the request extensions. Everything downstream
//! receives the caller as explicit parameters — there is no ambient
//! request identity.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use taskhub_auth::service::AuthService;
use taskhub_core::{Actor, ServiceError};

/// Check if a request path is public (no auth required).
///
/// The session endpoints authenticate themselves: login/signup by
/// credentials, refresh/logout by the refresh cookie.
fn is_public_path(path: &str) -> bool {
    matches!(path, "/health" | "/version") || path.starts_with("/auth/")
}

/// Middleware that turns a Bearer access token into an [`Actor`].
///
/// Verification failure and an unresolvable subject both yield 401 —
/// they are authentication failures, distinct from the 403s the
/// authorization engine produces later.
pub async fn auth_middleware(
    State(auth): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let path = request.uri().path().to_string();

    if is_public_path(&path) {
        return Ok(next.run(request).await);
    }

    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ServiceError::Unauthorized("missing authorization token".into()))?;

    let user_id = auth.verify_access(token)?;
    let role = auth.resolve_role(&user_id)?;

    request.extensions_mut().insert(Actor::new(user_id, role));

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_paths() {
        assert!(is_public_path("/health"));
        assert!(is_public_path("/version"));
        assert!(is_public_path("/auth/login"));
        assert!(is_public_path("/auth/signup"));
        assert!(is_public_path("/auth/refresh"));
        assert!(is_public_path("/auth/logout"));

        assert!(!is_public_path("/tasks"));
        assert!(!is_public_path("/users"));
        assert!(!is_public_path("/"));
    }
}
