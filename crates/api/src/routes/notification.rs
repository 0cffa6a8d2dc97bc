use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
};
use bson::{doc, oid::ObjectId};
use dagboek_db::models::{MemberRole, NotificationStatus, NotificationType};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, parse_object_id},
    extractors::auth::AuthUser,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub status: String,
    pub sender: Option<SenderEntry>,
    pub project: Option<ProjectEntry>,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct SenderEntry {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ProjectEntry {
    pub id: String,
    pub name: String,
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    let notifications = state.notifications.find_for_user(auth.user_id).await?;

    let sender_ids: Vec<ObjectId> = notifications.iter().map(|n| n.sender).collect();
    let senders: HashMap<ObjectId, String> = state
        .users
        .find_by_ids(&sender_ids)
        .await?
        .into_iter()
        .filter_map(|u| u.id.map(|id| (id, u.name)))
        .collect();

    let project_ids: Vec<ObjectId> = notifications.iter().filter_map(|n| n.project).collect();
    let projects: HashMap<ObjectId, String> = if project_ids.is_empty() {
        HashMap::new()
    } else {
        state
            .projects
            .base
            .find_many(doc! { "_id": { "$in": &project_ids } }, None)
            .await?
            .into_iter()
            .filter_map(|p| p.id.map(|id| (id, p.name)))
            .collect()
    };

    let out = notifications
        .into_iter()
        .map(|n| NotificationResponse {
            id: super::id_hex(n.id),
            notification_type: super::enum_str(&n.notification_type),
            status: super::enum_str(&n.status),
            sender: senders.get(&n.sender).map(|name| SenderEntry {
                id: n.sender.to_hex(),
                name: name.clone(),
            }),
            project: n.project.and_then(|pid| {
                projects.get(&pid).map(|name| ProjectEntry {
                    id: pid.to_hex(),
                    name: name.clone(),
                })
            }),
            created_at: super::rfc3339(n.created_at),
        })
        .collect();
    Ok(Json(out))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let updated = state.notifications.mark_all_read(auth.user_id).await?;
    Ok(Json(serde_json::json!({ "updated": updated })))
}

/// Accept or decline a project invitation. Either way the
/// notification is marked read so it cannot be answered twice.
pub async fn respond(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(notification_id): Path<String>,
    Json(body): Json<RespondRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_object_id(&notification_id, "notification id")?;
    let notification = state.notifications.base.find_by_id(id).await?;

    if notification.recipient != auth.user_id {
        return Err(ApiError::Forbidden(
            "Not the recipient of this notification".to_string(),
        ));
    }
    if notification.notification_type != NotificationType::ProjectInvitation {
        return Err(ApiError::BadRequest(
            "Notification is not an invitation".to_string(),
        ));
    }
    if notification.status == NotificationStatus::Read {
        return Err(ApiError::BadRequest(
            "Invitation has already been answered".to_string(),
        ));
    }
    let project_id = notification
        .project
        .ok_or_else(|| ApiError::BadRequest("Invitation has no project".to_string()))?;

    let message = match body.response.as_str() {
        "accept" => {
            let project = state.projects.base.find_by_id(project_id).await?;
            if !dagboek_services::policy::is_member(&project, auth.user_id) {
                state
                    .projects
                    .add_member(project_id, auth.user_id, MemberRole::Member)
                    .await?;
            }
            state
                .change_log
                .log_change(project_id, auth.user_id, "joined the project.", "team")
                .await;
            "Invitation accepted."
        }
        "decline" => "Invitation declined.",
        _ => {
            return Err(ApiError::BadRequest(
                "Response must be accept or decline".to_string(),
            ));
        }
    };

    state.notifications.mark_read(id).await?;
    Ok(Json(serde_json::json!({ "message": message })))
}
