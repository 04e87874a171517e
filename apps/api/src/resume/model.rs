use std::path::Path;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const PDF_MIME: &str = "application/pdf";
pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;
/// Key prefix for resume blobs inside the file stage.
pub const RESUME_KEY_PREFIX: &str = "resumes";

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    pub id: Uuid,
    pub file_name: String,
    pub original_name: String,
    /// Key of the blob inside the file stage. Never sent to clients.
    #[serde(skip_serializing)]
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub is_active: bool,
    pub uploaded_by: Option<Uuid>,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public metadata of a resume.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSummary {
    pub id: Uuid,
    pub file_name: String,
    pub original_name: String,
    pub file_size: i64,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Resume> for ResumeSummary {
    fn from(resume: &Resume) -> Self {
        Self {
            id: resume.id,
            file_name: resume.file_name.clone(),
            original_name: resume.original_name.clone(),
            file_size: resume.file_size,
            uploaded_at: resume.uploaded_at,
            updated_at: resume.updated_at,
        }
    }
}

/// An uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub bytes: Bytes,
    pub original_name: String,
    pub mime_type: String,
}

#[derive(Debug, Clone)]
pub struct ResumeDownload {
    pub bytes: Bytes,
    pub original_name: String,
}

/// `resume-<unix millis>-<random 0..1e9><.ext>`, keeping the original
/// extension lowercased. Non-alphanumeric extensions are dropped.
pub fn generate_file_name(original_name: &str, now: DateTime<Utc>) -> String {
    let suffix = fastrand::u32(0..1_000_000_000);
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();
    format!("resume-{}-{}{}", now.timestamp_millis(), suffix, ext)
}

pub fn storage_key(file_name: &str) -> String {
    format!("{RESUME_KEY_PREFIX}/{file_name}")
}
