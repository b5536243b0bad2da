use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Extension, Json, Router};

use taskhub_core::{Actor, Role, ServiceError};

use crate::api::AppState;
use crate::model::{SetRoleRequest, UserProfile};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/role", put(set_role))
}

/// List users for the assignment picker. Admin and Root only — plain
/// users have no one to assign.
async fn list_users(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    if actor.role < Role::Admin {
        return Err(ServiceError::PermissionDenied(
            "listing users requires the Admin role".into(),
        ));
    }

    let users = svc.list_users()?;
    let items: Vec<UserProfile> = users.iter().map(UserProfile::from).collect();
    Ok(Json(serde_json::json!({
        "items": items,
        "total": items.len(),
    })))
}

async fn get_user(
    State(svc): State<AppState>,
    Extension(_actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<UserProfile>, ServiceError> {
    let user = svc.get_user(&id)?;
    Ok(Json(UserProfile::from(&user)))
}

/// The administrative role-assignment action. Root only.
async fn set_role(
    State(svc): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(input): Json<SetRoleRequest>,
) -> Result<Json<UserProfile>, ServiceError> {
    if actor.role != Role::Root {
        return Err(ServiceError::PermissionDenied(
            "only Root may change roles".into(),
        ));
    }

    let user = svc.set_role(&id, input.role)?;
    Ok(Json(UserProfile::from(&user)))
}
