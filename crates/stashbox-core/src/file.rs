//! File metadata and upload validation for stashbox.
//!
//! The validation helpers are pure functions so the upload rules can be
//! tested without a running service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{FileId, UserId};

/// Maximum accepted size for a single uploaded file (10 MiB).
pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// File extensions accepted for upload (matched case-insensitively).
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "pdf", "txt", "docx", "xlsx"];

/// Metadata record for one stored file.
///
/// Created on successful upload, mutated only by the visibility toggle,
/// destroyed on explicit delete. Ownership is immutable once set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Unique file identifier.
    pub id: FileId,

    /// Object name in durable byte storage (`<uuid>.<ext>`).
    pub storage_name: String,

    /// Sanitized display name as declared by the uploader.
    pub name: String,

    /// Size of the stored bytes.
    pub size_bytes: u64,

    /// Declared content type.
    pub content_type: String,

    /// Owning user. Never changes after upload.
    pub owner: UserId,

    /// Whether the file is visible without ownership.
    pub is_public: bool,

    /// When the file was uploaded.
    pub uploaded_at: DateTime<Utc>,
}

impl FileRecord {
    /// Create a private metadata record for a freshly stored file.
    #[must_use]
    pub fn new(
        storage_name: String,
        name: String,
        size_bytes: u64,
        content_type: String,
        owner: UserId,
    ) -> Self {
        Self {
            id: FileId::generate(),
            storage_name,
            name,
            size_bytes,
            content_type,
            owner,
            is_public: false,
            uploaded_at: Utc::now(),
        }
    }
}

/// Normalize a declared file name for storage in metadata.
///
/// Strips directory components (both separators) and trims whitespace.
/// Returns `None` when nothing usable remains. Dots inside a name are
/// fine; only the bare `..` component is rejected, since everything else
/// has already lost its directory context.
#[must_use]
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let cleaned = raw.replace('\\', "/");
    let base = cleaned.rsplit('/').next().unwrap_or("").trim();

    if base.is_empty() || base == ".." {
        return None;
    }

    Some(base.to_string())
}

/// Extract the extension of a file name, without the dot.
///
/// Returns `None` for names with no dot or with an empty trailing part.
#[must_use]
pub fn file_extension(name: &str) -> Option<&str> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.trim().is_empty() {
        return None;
    }
    Some(ext)
}

/// Check an extension against the upload allow-list, case-insensitively.
#[must_use]
pub fn extension_allowed(ext: &str) -> bool {
    let lower = ext.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&lower.as_str())
}

/// Generate a collision-free storage object name keeping the original
/// extension. Writes at this name may overwrite; the collision probability
/// of a random UUID is treated as negligible.
#[must_use]
pub fn storage_name_for(ext: &str) -> String {
    format!("{}.{ext}", uuid::Uuid::new_v4())
}
