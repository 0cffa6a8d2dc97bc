use axum::{
    Json,
    extract::{Path, State},
};
use bson::doc;
use dagboek_db::models::{UserRole, UserStatus};
use serde::Deserialize;

use super::auth::{UserResponse, to_user_response};
use crate::{
    error::{ApiError, parse_object_id},
    extractors::auth::{AdminUser, AuthUser},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub theme: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: String,
}

pub async fn list(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.users.find_all().await?;
    Ok(Json(users.into_iter().map(to_user_response).collect()))
}

pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let mut set = bson::Document::new();
    if let Some(name) = body.name {
        set.insert("name", name);
    }
    if let Some(email) = body.email {
        set.insert("email", email.trim().to_lowercase());
    }
    if let Some(theme) = body.theme {
        set.insert("theme", theme);
    }
    if let Some(password) = body.password {
        set.insert("password", state.auth.hash_password(&password)?);
    }

    if !set.is_empty() {
        state
            .users
            .base
            .update_one(doc! { "_id": auth.user_id }, doc! { "$set": set })
            .await?;
    }

    let user = state.users.base.find_by_id(auth.user_id).await?;
    Ok(Json(to_user_response(user)))
}

pub async fn approve(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    set_status(&state, &user_id, UserStatus::Approved).await
}

pub async fn block(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    set_status(&state, &user_id, UserStatus::Blocked).await
}

pub async fn unblock(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    set_status(&state, &user_id, UserStatus::Approved).await
}

async fn set_status(
    state: &AppState,
    user_id: &str,
    status: UserStatus,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_object_id(user_id, "user id")?;
    let updated = state.users.set_status(id, status).await?;
    if !updated {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    let user = state.users.base.find_by_id(id).await?;
    Ok(Json(to_user_response(user)))
}

pub async fn set_role(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(user_id): Path<String>,
    Json(body): Json<SetRoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_object_id(&user_id, "user id")?;
    let role: UserRole = super::parse_enum(&body.role, "role")?;

    let updated = state.users.set_role(id, role).await?;
    if !updated {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    let user = state.users.base.find_by_id(id).await?;
    Ok(Json(to_user_response(user)))
}
