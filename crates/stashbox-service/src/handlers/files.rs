//! File upload and management handlers.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use stashbox_core::{
    extension_allowed, file_extension, sanitize_file_name, storage_name_for, FileId, FileRecord,
    MAX_FILE_SIZE_BYTES,
};
use stashbox_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// File metadata response.
#[derive(Debug, Serialize)]
pub struct FileResponse {
    /// File ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Size of the stored bytes.
    pub size_bytes: u64,
    /// Declared content type.
    pub content_type: String,
    /// Whether the file is publicly visible.
    pub is_public: bool,
    /// Upload timestamp.
    pub uploaded_at: String,
}

impl From<&FileRecord> for FileResponse {
    fn from(record: &FileRecord) -> Self {
        Self {
            id: record.id.to_string(),
            name: record.name.clone(),
            size_bytes: record.size_bytes,
            content_type: record.content_type.clone(),
            is_public: record.is_public,
            uploaded_at: record.uploaded_at.to_rfc3339(),
        }
    }
}

/// Upload batch response.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Stored files, in input order.
    pub files: Vec<FileResponse>,
}

/// One buffered part of the multipart batch.
struct UploadPart {
    file_name: String,
    content_type: String,
    data: axum::body::Bytes,
}

/// Upload a batch of files.
///
/// The credit check runs once against the whole batch before anything is
/// stored. Per-file validation is fail-fast: the first rejected file aborts
/// the call, and files stored before it stay stored and charged.
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    // Buffer the whole batch so the credit check can see its size up front.
    let mut parts = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart request: {e}")))?
    {
        if field.name() != Some("files") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file data: {e}")))?;

        parts.push(UploadPart {
            file_name,
            content_type,
            data,
        });
    }

    if parts.is_empty() {
        return Err(ApiError::BadRequest("No files provided".into()));
    }

    let required = i64::try_from(parts.len())
        .map_err(|_| ApiError::BadRequest("Too many files in batch".into()))?;

    let account = state.store.get_or_init_credits(&auth.user_id)?;
    if !account.has_enough(required) {
        return Err(ApiError::InsufficientCredits {
            balance: account.credits,
            required,
        });
    }

    let mut stored = Vec::with_capacity(parts.len());
    for part in parts {
        let record = store_one_file(&state, &auth, part).await?;
        stored.push(FileResponse::from(&record));
    }

    tracing::info!(user_id = %auth.user_id, count = stored.len(), "Upload batch stored");

    Ok(Json(UploadResponse { files: stored }))
}

/// Validate, store, and charge a single file of the batch.
async fn store_one_file(
    state: &AppState,
    auth: &AuthUser,
    part: UploadPart,
) -> Result<FileRecord, ApiError> {
    if part.data.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "File '{}' is empty",
            part.file_name
        )));
    }

    if part.data.len() as u64 > MAX_FILE_SIZE_BYTES {
        return Err(ApiError::BadRequest(format!(
            "File '{}' exceeds the {} MiB limit",
            part.file_name,
            MAX_FILE_SIZE_BYTES / (1024 * 1024)
        )));
    }

    let name = sanitize_file_name(&part.file_name)
        .ok_or_else(|| ApiError::BadRequest("File name is empty or invalid".into()))?;

    let ext = file_extension(&name)
        .ok_or_else(|| ApiError::BadRequest(format!("File '{name}' has no extension")))?;

    if !extension_allowed(ext) {
        return Err(ApiError::UnsupportedType(format!(
            "File type .{ext} is not allowed"
        )));
    }

    let storage_name = storage_name_for(ext);
    state
        .blobs
        .write(&storage_name, &part.data)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to store file bytes: {e}")))?;

    let record = FileRecord::new(
        storage_name,
        name,
        part.data.len() as u64,
        part.content_type,
        auth.user_id,
    );
    state.store.put_file(&record)?;

    // The batch check already covered this consumption; an exhausted ledger
    // here is logged but does not fail the stored file.
    if !state.store.consume_credit(&auth.user_id)?.is_consumed() {
        tracing::warn!(user_id = %auth.user_id, "Ledger exhausted while charging upload");
    }

    Ok(record)
}

/// List the current user's files.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Vec<FileResponse>>, ApiError> {
    let records = state.store.list_files_by_owner(&auth.user_id)?;

    Ok(Json(records.iter().map(FileResponse::from).collect()))
}

/// Get a file's metadata, only if it is public.
///
/// Private files are indistinguishable from missing ones.
pub async fn get_public_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<FileId>,
) -> Result<Json<FileResponse>, ApiError> {
    let record = state
        .store
        .get_file(&id)?
        .filter(|r| r.is_public)
        .ok_or_else(|| ApiError::NotFound("File not found".into()))?;

    Ok(Json(FileResponse::from(&record)))
}

/// Download a file's bytes regardless of visibility.
///
/// Authorization for private downloads happens upstream; this endpoint only
/// requires an authenticated caller.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(id): Path<FileId>,
) -> Result<Response, ApiError> {
    let record = state
        .store
        .get_file(&id)?
        .ok_or_else(|| ApiError::NotFound("File not found".into()))?;

    let bytes = state
        .blobs
        .read(&record.storage_name)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to read file bytes: {e}")))?;

    let headers = [
        (header::CONTENT_TYPE, record.content_type.clone()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", record.name),
        ),
    ];

    Ok((headers, bytes).into_response())
}

/// Delete a file owned by the current user.
///
/// Bytes go first, then metadata; byte deletion is idempotent so a retry
/// after a partial failure converges.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<FileId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let record = state
        .store
        .get_file(&id)?
        .ok_or_else(|| ApiError::NotFound("File not found".into()))?;

    if record.owner != auth.user_id {
        return Err(ApiError::Forbidden);
    }

    state
        .blobs
        .delete_if_exists(&record.storage_name)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to delete file bytes: {e}")))?;

    state.store.delete_file(&id)?;

    tracing::info!(user_id = %auth.user_id, file_id = %id, "File deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Toggle a file's public visibility.
pub async fn toggle_visibility(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(id): Path<FileId>,
) -> Result<Json<FileResponse>, ApiError> {
    let mut record = state
        .store
        .get_file(&id)?
        .ok_or_else(|| ApiError::NotFound("File not found".into()))?;

    record.is_public = !record.is_public;
    state.store.put_file(&record)?;

    Ok(Json(FileResponse::from(&record)))
}
