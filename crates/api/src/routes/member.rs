use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
};
use bson::{doc, oid::ObjectId};
use dagboek_db::models::{MemberRole, Project};
use dagboek_services::policy;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, parse_object_id},
    extractors::auth::AuthUser,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct SetMemberRoleRequest {
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub user: MemberUser,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct MemberUser {
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: String,
}

async fn members_with_users(
    state: &AppState,
    project: &Project,
) -> Result<Vec<MemberResponse>, ApiError> {
    let ids: Vec<ObjectId> = project.members.iter().map(|m| m.user).collect();
    let users = state.users.find_by_ids(&ids).await?;
    let by_id: HashMap<ObjectId, _> = users
        .into_iter()
        .filter_map(|u| u.id.map(|id| (id, u)))
        .collect();

    let mut out = Vec::with_capacity(project.members.len());
    for member in &project.members {
        // Members whose user document is gone are skipped rather than surfaced.
        if let Some(user) = by_id.get(&member.user) {
            out.push(MemberResponse {
                user: MemberUser {
                    id: member.user.to_hex(),
                    name: user.name.clone(),
                    username: user.username.clone(),
                    email: user.email.clone(),
                },
                role: super::enum_str(&member.role),
            });
        }
    }
    Ok(out)
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<MemberResponse>>, ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;

    Ok(Json(members_with_users(&state, &project).await?))
}

pub async fn invite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
    Json(body): Json<InviteRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_manager(&project, auth.user_id, auth.role)?;

    let email = body.email.trim().to_lowercase();
    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    let user_id = user
        .id
        .ok_or_else(|| ApiError::Internal("User without id".to_string()))?;

    if policy::is_member(&project, user_id) {
        return Err(ApiError::BadRequest(
            "User is already a member of this project".to_string(),
        ));
    }
    if state.notifications.has_pending_invitation(user_id, id).await? {
        return Err(ApiError::BadRequest(
            "An invitation has already been sent to this user".to_string(),
        ));
    }

    state
        .notifications
        .create_invitation(auth.user_id, user_id, id)
        .await?;
    Ok(Json(serde_json::json!({ "message": "Invitation sent" })))
}

pub async fn set_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((project_id, member_id)): Path<(String, String)>,
    Json(body): Json<SetMemberRoleRequest>,
) -> Result<Json<Vec<MemberResponse>>, ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let target = parse_object_id(&member_id, "member id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_manager(&project, auth.user_id, auth.role)?;

    let role: MemberRole = super::parse_enum(&body.role, "role")?;
    if role == MemberRole::Owner {
        return Err(ApiError::BadRequest(
            "Cannot assign the owner role".to_string(),
        ));
    }
    match policy::member_role(&project, target) {
        None => return Err(ApiError::NotFound("Member not found".to_string())),
        Some(MemberRole::Owner) => {
            return Err(ApiError::BadRequest(
                "Cannot change the owner's role".to_string(),
            ));
        }
        Some(_) => {}
    }

    state.projects.set_member_role(id, target, role).await?;
    let project = state.projects.base.find_by_id(id).await?;
    Ok(Json(members_with_users(&state, &project).await?))
}

pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((project_id, member_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let target = parse_object_id(&member_id, "member id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_manager(&project, auth.user_id, auth.role)?;

    match policy::member_role(&project, target) {
        None => return Err(ApiError::NotFound("Member not found".to_string())),
        Some(MemberRole::Owner) => {
            return Err(ApiError::BadRequest(
                "Cannot remove the project owner".to_string(),
            ));
        }
        Some(_) => {}
    }

    state.projects.remove_member(id, target).await?;

    let name = state
        .users
        .base
        .find_one(doc! { "_id": target })
        .await?
        .map(|u| u.name)
        .unwrap_or_else(|| "a member".to_string());
    state
        .change_log
        .log_change(
            id,
            auth.user_id,
            &format!("removed {name} from the project."),
            "team",
        )
        .await;

    Ok(Json(serde_json::json!({ "message": "Member removed" })))
}
