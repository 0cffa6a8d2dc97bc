use axum::{
    Json,
    extract::{Multipart, State},
};
use dagboek_db::models::SiteSettings;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{error::ApiError, extractors::auth::AdminUser, state::AppState};

use super::task_attachment::read_upload_field;

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub site_name: Option<String>,
    pub maintenance_mode: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct SiteSettingsResponse {
    pub site_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_logo: Option<String>,
    pub maintenance_mode: bool,
    pub updated_at: String,
}

fn to_response(settings: SiteSettings) -> SiteSettingsResponse {
    SiteSettingsResponse {
        site_name: settings.site_name,
        site_logo: settings.site_logo,
        maintenance_mode: settings.maintenance_mode,
        updated_at: super::rfc3339(settings.updated_at),
    }
}

/// Public: the login page reads the site name and logo before auth.
pub async fn get(
    State(state): State<AppState>,
) -> Result<Json<SiteSettingsResponse>, ApiError> {
    let settings = state.site_settings.get_or_create().await?;
    Ok(Json(to_response(settings)))
}

pub async fn update(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(body): Json<UpdateSettingsRequest>,
) -> Result<Json<SiteSettingsResponse>, ApiError> {
    let settings = state
        .site_settings
        .update(body.site_name, body.maintenance_mode)
        .await?;
    Ok(Json(to_response(settings)))
}

/// The logo lives at a fixed path so a re-upload replaces it.
pub async fn upload_logo(
    State(state): State<AppState>,
    _admin: AdminUser,
    mut multipart: Multipart,
) -> Result<Json<SiteSettingsResponse>, ApiError> {
    let file = read_upload_field(&mut multipart, "logo").await?;

    let extension = file
        .name
        .rsplit_once('.')
        .map(|(_, ext)| format!(".{ext}"))
        .unwrap_or_default();
    let filename = format!("logo{extension}");

    let dir = &state.settings.uploads.dir;
    tokio::fs::create_dir_all(dir).await.map_err(|err| {
        warn!(%err, %dir, "Failed to create uploads directory");
        ApiError::Internal("Failed to store logo".to_string())
    })?;
    let path = std::path::Path::new(dir).join(&filename);
    tokio::fs::write(&path, &file.bytes).await.map_err(|err| {
        warn!(%err, path = %path.display(), "Failed to write logo");
        ApiError::Internal("Failed to store logo".to_string())
    })?;

    let settings = state
        .site_settings
        .set_logo(format!("/uploads/{filename}"))
        .await?;
    Ok(Json(to_response(settings)))
}
