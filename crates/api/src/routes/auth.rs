use axum::{Json, extract::State, http::StatusCode};
use dagboek_db::models::{User, UserStatus};
use dagboek_services::dao::base::DaoError;
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub theme: String,
}

pub fn to_user_response(user: User) -> UserResponse {
    UserResponse {
        id: super::id_hex(user.id),
        name: user.name,
        username: user.username,
        email: user.email,
        role: super::enum_str(&user.role),
        status: super::enum_str(&user.status),
        theme: user.theme,
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    if body.name.trim().is_empty()
        || body.username.trim().is_empty()
        || body.email.trim().is_empty()
        || body.password.is_empty()
    {
        return Err(ApiError::BadRequest(
            "Name, username, email and password are required".to_string(),
        ));
    }

    if state.users.find_by_email(&body.email).await?.is_some()
        || state.users.find_by_username(&body.username).await?.is_some()
    {
        return Err(ApiError::BadRequest("User already exists".to_string()));
    }

    let password_hash = state.auth.hash_password(&body.password)?;
    let result = state
        .users
        .create(body.name, body.username, body.email, password_hash)
        .await;

    match result {
        Ok(_) => Ok((
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "User registered successfully. Please wait for admin approval."
            })),
        )),
        // Unique-index race between the pre-check and the insert.
        Err(DaoError::DuplicateKey(_)) => {
            Err(ApiError::BadRequest("User already exists".to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .users
        .find_by_email(&body.email)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Invalid credentials".to_string()))?;

    // Status gate comes before password verification.
    match user.status {
        UserStatus::Approved => {}
        UserStatus::Pending => {
            return Err(ApiError::Forbidden(
                "Your account is pending approval.".to_string(),
            ));
        }
        UserStatus::Blocked => {
            return Err(ApiError::Forbidden(
                "Your account has been blocked.".to_string(),
            ));
        }
    }

    let password_hash = user
        .password
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("Invalid credentials".to_string()))?;
    let valid = state.auth.verify_password(&body.password, password_hash)?;
    if !valid {
        return Err(ApiError::BadRequest("Invalid credentials".to_string()));
    }

    let user_id = user.id.ok_or_else(|| {
        ApiError::Internal("Loaded user has no id".to_string())
    })?;
    let token = state
        .auth
        .generate_token(user_id, &user.username, user.role)?;

    Ok(Json(LoginResponse {
        token,
        user: to_user_response(user),
    }))
}

pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.base.find_by_id(auth.user_id).await?;
    Ok(Json(to_user_response(user)))
}
