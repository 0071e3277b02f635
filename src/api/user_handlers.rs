//! User account CRUD.
//!
//! Passwords are hashed on the write path and never serialized back out.
//! Session/token issuing is handled elsewhere and is not part of this
//! server.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{now_epoch, AppState};
use crate::db::entities::{user, user::ROLE_ADMIN, user::ROLE_USER, User};
use crate::error::{Result, ServerError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub email: String,
    /// When present, replaces the stored password.
    pub password: Option<String>,
    pub firstname: String,
    pub lastname: String,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub role: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            firstname: model.firstname,
            lastname: model.lastname,
            role: model.role,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Hash a password with salt
fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"farm-registry-salt:");
    hasher.update(password.as_bytes());
    let result = hasher.finalize();
    result.iter().map(|b| format!("{:02x}", b)).collect()
}

fn validate_role(role: &Option<String>) -> Result<String> {
    match role.as_deref() {
        None => Ok(ROLE_USER.to_string()),
        Some(r) if r == ROLE_ADMIN || r == ROLE_USER => Ok(r.to_string()),
        Some(other) => Err(ServerError::InvalidRequest(format!(
            "Unknown role: {}",
            other
        ))),
    }
}

/// GET /api/users - List users
pub async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<UserResponse>>> {
    let users = User::find().all(&state.db).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /api/users/:id - Fetch one user
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>> {
    let user = User::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ServerError::UserNotFound(id))?;

    Ok(Json(UserResponse::from(user)))
}

/// POST /api/users - Create a user
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<UserResponse>> {
    if req.email.trim().is_empty() || !req.email.contains('@') {
        return Err(ServerError::InvalidRequest("Invalid email".to_string()));
    }
    if req.password.len() < 6 {
        return Err(ServerError::InvalidRequest(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    let role = validate_role(&req.role)?;

    let existing = User::find()
        .filter(user::Column::Email.eq(&req.email))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(ServerError::EmailTaken(req.email));
    }

    let now = now_epoch();
    let model = user::ActiveModel {
        email: Set(req.email),
        password_hash: Set(hash_password(&req.password)),
        firstname: Set(req.firstname),
        lastname: Set(req.lastname),
        role: Set(role),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = model.insert(&state.db).await?;
    tracing::info!("Created user {}", created.id);

    Ok(Json(UserResponse::from(created)))
}

/// PUT /api/users/:id - Update a user
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    let existing = User::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ServerError::UserNotFound(id))?;

    let role = validate_role(&req.role)?;

    // The new email must not belong to another account.
    let clash = User::find()
        .filter(user::Column::Email.eq(&req.email))
        .one(&state.db)
        .await?;
    if clash.map(|u| u.id != id).unwrap_or(false) {
        return Err(ServerError::EmailTaken(req.email));
    }

    let mut model: user::ActiveModel = existing.into();
    model.email = Set(req.email);
    model.firstname = Set(req.firstname);
    model.lastname = Set(req.lastname);
    model.role = Set(role);
    if let Some(password) = &req.password {
        if password.len() < 6 {
            return Err(ServerError::InvalidRequest(
                "Password must be at least 6 characters".to_string(),
            ));
        }
        model.password_hash = Set(hash_password(password));
    }
    model.updated_at = Set(now_epoch());

    let updated = model.update(&state.db).await?;

    Ok(Json(UserResponse::from(updated)))
}

/// DELETE /api/users/:id - Delete a user
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>> {
    let existing = User::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ServerError::UserNotFound(id))?;

    user::ActiveModel::from(existing).delete(&state.db).await?;
    tracing::info!("Deleted user {}", id);

    Ok(Json(serde_json::json!({
        "message": format!("User {} deleted", id)
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash() {
        let hash1 = hash_password("test123");
        let hash2 = hash_password("test123");
        let hash3 = hash_password("different");

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, hash3);
    }

    #[test]
    fn test_validate_role() {
        assert_eq!(validate_role(&None).unwrap(), ROLE_USER);
        assert_eq!(validate_role(&Some("admin".to_string())).unwrap(), ROLE_ADMIN);
        assert!(validate_role(&Some("root".to_string())).is_err());
    }
}
