//! Route registration — collects module routes + system endpoints.

use std::sync::Arc;

use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use taskhub_auth::service::AuthService;

use crate::auth_middleware;

/// Build the complete router with all routes.
pub fn build_router(auth: Arc<AuthService>, module_routes: Vec<(&str, Router)>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/version", get(version));

    // Module routers carry absolute paths and their own state.
    for (name, router) in module_routes {
        tracing::debug!(module = %name, "mounting module routes");
        app = app.merge(router);
    }

    // Bearer auth on everything except the public paths.
    app.layer(middleware::from_fn_with_state(
        auth,
        auth_middleware::auth_middleware,
    ))
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "taskhubd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
