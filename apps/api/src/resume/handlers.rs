use axum::{
    extract::{Multipart, Path, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
    response::IntoResponse,
    Extension, Json,
};
use serde::Serialize;

use crate::auth::AdminPrincipal;
use crate::errors::AppError;
use crate::resume::model::{Resume, ResumeSummary, ResumeUpload, PDF_MIME};
use crate::routes::{parse_id, MessageResponse};
use crate::state::AppState;

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "resume";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub resume: ResumeSummary,
}

#[derive(Debug, Serialize)]
pub struct ActivateResponse {
    pub message: String,
    pub resume: Resume,
}

/// GET /api/resume
pub async fn handle_get_active(
    State(state): State<AppState>,
) -> Result<Json<ResumeSummary>, AppError> {
    Ok(Json(state.resumes.get_active().await?))
}

/// GET /api/resume/download/:id
pub async fn handle_download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "Resume")?;
    let download = state.resumes.download(id).await?;

    let headers = [
        (CONTENT_TYPE, PDF_MIME.to_string()),
        (CONTENT_LENGTH, download.bytes.len().to_string()),
        (
            CONTENT_DISPOSITION,
            content_disposition(&download.original_name),
        ),
    ];
    Ok((headers, download.bytes))
}

/// GET /api/resume/admin
pub async fn handle_list_all(
    State(state): State<AppState>,
) -> Result<Json<Vec<Resume>>, AppError> {
    Ok(Json(state.resumes.list_all().await?))
}

/// POST /api/resume/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminPrincipal>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let original_name = field.file_name().unwrap_or("resume.pdf").to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await?;
        upload = Some(ResumeUpload {
            bytes,
            original_name,
            mime_type,
        });
        break;
    }

    let upload = upload.ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;
    let resume = state.resumes.upload(upload, admin.id).await?;

    Ok(Json(UploadResponse {
        message: "Resume uploaded successfully".to_string(),
        resume: ResumeSummary::from(&resume),
    }))
}

/// DELETE /api/resume/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id, "Resume")?;
    state.resumes.delete(id).await?;
    Ok(Json(MessageResponse::new("Resume deleted successfully")))
}

/// PUT /api/resume/:id/activate
pub async fn handle_activate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActivateResponse>, AppError> {
    let id = parse_id(&id, "Resume")?;
    let resume = state.resumes.activate(id).await?;
    Ok(Json(ActivateResponse {
        message: "Resume activated successfully".to_string(),
        resume,
    }))
}

/// `attachment` disposition carrying an ASCII fallback name plus the exact
/// original name as an RFC 5987 `filename*` parameter.
fn content_disposition(original_name: &str) -> String {
    let fallback = disposition_filename(original_name);
    let original = if original_name.trim().is_empty() {
        fallback.as_str()
    } else {
        original_name
    };
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(original)
    )
}

/// Header-safe ASCII rendition of the original file name.
fn disposition_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();
    if cleaned.trim().is_empty() {
        "resume.pdf".to_string()
    } else {
        cleaned
    }
}
