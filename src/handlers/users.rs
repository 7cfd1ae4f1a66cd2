use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{password, require_role, Claims, Role};
use crate::server::error::ApiError;
use crate::store::{self, NewUser, User, UserStore};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

pub async fn create(
    State(users): State<UserStore>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<User>, ApiError> {
    require_role(&claims, Role::Superadmin)?;

    let email = req
        .email
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("missing required field: email"))?;
    let plain = req
        .password
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("missing required field: password"))?;
    let role_raw = req.role.as_deref().unwrap_or("technician");
    let role = Role::parse(role_raw)
        .ok_or_else(|| ApiError::validation(format!("unknown role: {role_raw}")))?;

    let user = users
        .create(NewUser {
            email: email.to_string(),
            password_hash: password::hash_password(plain),
            role,
        })
        .await
        .map_err(|e| {
            if store::is_unique_violation(&e) {
                ApiError::conflict(format!("email already registered: {email}"))
            } else {
                ApiError::Internal(e.into())
            }
        })?;

    tracing::info!(email = %user.email, role = user.role.as_str(), "user created");
    Ok(Json(user))
}

pub async fn list(
    State(users): State<UserStore>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<User>>, ApiError> {
    require_role(&claims, Role::Superadmin)?;
    Ok(Json(users.list().await?))
}

pub async fn delete(
    State(users): State<UserStore>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    require_role(&claims, Role::Superadmin)?;
    if !users.delete(&id).await? {
        return Err(ApiError::not_found(format!("user not found: {id}")));
    }
    tracing::info!(user.id = %id, actor = %claims.email, "user deleted");
    Ok(Json(json!({ "ok": true })))
}
