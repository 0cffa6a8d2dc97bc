use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use bson::{DateTime, Document, oid::ObjectId};
use dagboek_db::models::{Attachment, ErrorReport, ErrorSeverity, ErrorStatus};
use dagboek_services::policy;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, parse_object_id},
    extractors::auth::AuthUser,
    state::AppState,
    uploads,
};

use super::{AttachmentResponse, task_attachment::read_upload_field};

#[derive(Debug, Deserialize)]
pub struct CreateErrorReportRequest {
    pub title: String,
    pub description: Option<String>,
    pub severity: Option<String>,
    pub assigned_to: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateErrorReportRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub assigned_to: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ErrorReportResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: String,
    pub status: String,
    pub project: String,
    pub created_by: String,
    pub assigned_to: Vec<String>,
    pub attachments: Vec<AttachmentResponse>,
    pub created_at: String,
    pub updated_at: String,
}

fn to_response(report: ErrorReport) -> ErrorReportResponse {
    ErrorReportResponse {
        id: super::id_hex(report.id),
        title: report.title,
        description: report.description,
        severity: super::enum_str(&report.severity),
        status: super::enum_str(&report.status),
        project: report.project.to_hex(),
        created_by: report.created_by.to_hex(),
        assigned_to: report.assigned_to.iter().map(|a| a.to_hex()).collect(),
        attachments: report.attachments.iter().map(super::attachment_response).collect(),
        created_at: super::rfc3339(report.created_at),
        updated_at: super::rfc3339(report.updated_at),
    }
}

fn parse_assignees(raw: Vec<String>) -> Result<Vec<ObjectId>, ApiError> {
    raw.iter().map(|id| parse_object_id(id, "user id")).collect()
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<ErrorReportResponse>>, ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;

    let reports = state.error_reports.find_by_project(id).await?;
    Ok(Json(reports.into_iter().map(to_response).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
    Json(body): Json<CreateErrorReportRequest>,
) -> Result<(StatusCode, Json<ErrorReportResponse>), ApiError> {
    let id = parse_object_id(&project_id, "project id")?;
    let project = state.projects.base.find_by_id(id).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;

    if body.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }
    let severity = match body.severity {
        Some(raw) => super::parse_enum::<ErrorSeverity>(&raw, "severity")?,
        None => ErrorSeverity::default(),
    };
    let assigned_to = parse_assignees(body.assigned_to.unwrap_or_default())?;

    let report = state
        .error_reports
        .create(
            id,
            auth.user_id,
            body.title,
            body.description.unwrap_or_default(),
            severity,
            assigned_to,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(to_response(report))))
}

async fn load_report_checked(
    state: &AppState,
    auth: &AuthUser,
    report_id: &str,
) -> Result<ErrorReport, ApiError> {
    let id = parse_object_id(report_id, "error report id")?;
    let report = state.error_reports.base.find_by_id(id).await?;
    let project = state.projects.base.find_by_id(report.project).await?;
    policy::ensure_member(&project, auth.user_id, auth.role)?;
    Ok(report)
}

/// Status changes are free-form; there is no transition graph.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(report_id): Path<String>,
    Json(body): Json<UpdateErrorReportRequest>,
) -> Result<Json<ErrorReportResponse>, ApiError> {
    let report = load_report_checked(&state, &auth, &report_id).await?;
    let id = report.id.ok_or_else(|| ApiError::Internal("Report without id".to_string()))?;

    let mut set = Document::new();
    if let Some(title) = body.title {
        if title.trim().is_empty() {
            return Err(ApiError::BadRequest("Title is required".to_string()));
        }
        set.insert("title", title);
    }
    if let Some(description) = body.description {
        set.insert("description", description);
    }
    if let Some(raw) = body.severity {
        let severity = super::parse_enum::<ErrorSeverity>(&raw, "severity")?;
        set.insert("severity", bson::ser::to_bson(&severity)?);
    }
    if let Some(raw) = body.status {
        let status = super::parse_enum::<ErrorStatus>(&raw, "status")?;
        set.insert("status", bson::ser::to_bson(&status)?);
    }
    if let Some(assigned_to) = body.assigned_to {
        set.insert("assigned_to", parse_assignees(assigned_to)?);
    }

    if set.is_empty() {
        return Ok(Json(to_response(report)));
    }
    let report = state.error_reports.update_fields(id, set).await?;
    Ok(Json(to_response(report)))
}

pub async fn add_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(report_id): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<AttachmentResponse>), ApiError> {
    let report = load_report_checked(&state, &auth, &report_id).await?;
    let id = report.id.ok_or_else(|| ApiError::Internal("Report without id".to_string()))?;

    let file = read_upload_field(&mut multipart, "file").await?;
    let saved = uploads::save_upload(
        &state.settings.uploads.dir,
        &report.project.to_hex(),
        &file.name,
        &file.bytes,
    )
    .await?;

    let attachment = Attachment {
        id: ObjectId::new(),
        filename: saved.filename,
        original_name: file.name,
        url_path: saved.url_path,
        mime_type: file.mime_type,
        size: Some(file.bytes.len() as i64),
        created_by: auth.user_id,
        created_at: DateTime::now(),
    };
    state.error_reports.push_attachment(id, &attachment).await?;

    Ok((StatusCode::CREATED, Json(super::attachment_response(&attachment))))
}

pub async fn delete_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((report_id, attachment_id)): Path<(String, String)>,
) -> Result<Json<Vec<AttachmentResponse>>, ApiError> {
    let report = load_report_checked(&state, &auth, &report_id).await?;
    let id = report.id.ok_or_else(|| ApiError::Internal("Report without id".to_string()))?;
    let attachment_id = parse_object_id(&attachment_id, "attachment id")?;

    let attachment = report
        .attachments
        .iter()
        .find(|a| a.id == attachment_id)
        .ok_or_else(|| ApiError::NotFound("Attachment not found".to_string()))?;
    let url_path = attachment.url_path.clone();

    let report = state.error_reports.pull_attachment(id, attachment_id).await?;
    uploads::remove_upload(&state.settings.uploads.dir, &url_path).await;

    Ok(Json(report.attachments.iter().map(super::attachment_response).collect()))
}
