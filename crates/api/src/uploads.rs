use std::path::{Path, PathBuf};

use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;

/// A multipart file persisted under the uploads directory.
pub struct SavedFile {
    /// Unique-prefixed name on disk.
    pub filename: String,
    /// Public path as served under `/uploads`.
    pub url_path: String,
}

/// Strips any client-supplied directory components.
fn sanitize_name(original: &str) -> String {
    let name = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("file")
        .trim();
    if name.is_empty() {
        "file".to_string()
    } else {
        name.to_string()
    }
}

/// Writes `bytes` under `<uploads_dir>/<subdir>/` with a unique-prefixed
/// filename and returns the on-disk name plus its public `/uploads` path.
pub async fn save_upload(
    uploads_dir: &str,
    subdir: &str,
    original_name: &str,
    bytes: &[u8],
) -> Result<SavedFile, ApiError> {
    let filename = format!("{}-{}", Uuid::new_v4(), sanitize_name(original_name));

    let dir = Path::new(uploads_dir).join(subdir);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to create upload dir: {e}")))?;

    let path = dir.join(&filename);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to write file: {e}")))?;

    let url_path = if subdir.is_empty() {
        format!("/uploads/{filename}")
    } else {
        format!("/uploads/{subdir}/{filename}")
    };

    Ok(SavedFile { filename, url_path })
}

/// Maps a public `/uploads` path back to disk. Returns None for paths that
/// do not point into the uploads tree.
fn disk_path(uploads_dir: &str, url_path: &str) -> Option<PathBuf> {
    let relative = url_path.strip_prefix("/uploads/")?;
    if relative.contains("..") {
        return None;
    }
    Some(Path::new(uploads_dir).join(relative))
}

/// Best-effort removal of a stored file; a missing file is not an error.
pub async fn remove_upload(uploads_dir: &str, url_path: &str) {
    let Some(path) = disk_path(uploads_dir, url_path) else {
        return;
    };
    if let Err(err) = tokio::fs::remove_file(&path).await {
        if err.kind() != std::io::ErrorKind::NotFound {
            warn!(%err, path = %path.display(), "Failed to remove uploaded file");
        }
    }
}
