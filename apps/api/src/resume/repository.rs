use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::resume::file_stage::FileStage;
use crate::resume::model::{
    generate_file_name, storage_key, Resume, ResumeDownload, ResumeSummary, ResumeUpload,
    MAX_RESUME_BYTES, PDF_MIME,
};
use crate::resume::store::ResumeStore;

/// Resume metadata CRUD on top of a blob stage, keeping at most one resume active.
#[derive(Clone)]
pub struct ResumeRepository {
    store: Arc<dyn ResumeStore>,
    stage: Arc<dyn FileStage>,
}

impl ResumeRepository {
    pub fn new(store: Arc<dyn ResumeStore>, stage: Arc<dyn FileStage>) -> Self {
        Self { store, stage }
    }

    pub async fn get_active(&self) -> Result<ResumeSummary, AppError> {
        let resume = self
            .store
            .find_active()
            .await?
            .ok_or_else(|| AppError::NotFound("No resume found".to_string()))?;
        Ok(ResumeSummary::from(&resume))
    }

    pub async fn list_all(&self) -> Result<Vec<Resume>, AppError> {
        self.store.list().await
    }

    /// Validates and stores the blob, then records it as the only active resume.
    /// Nothing is recorded if the blob cannot be written.
    pub async fn upload(&self, upload: ResumeUpload, uploader: Uuid) -> Result<Resume, AppError> {
        validate_upload(&upload)?;

        let now = Utc::now();
        let file_name = generate_file_name(&upload.original_name, now);
        let key = storage_key(&file_name);
        let file_size = upload.bytes.len() as i64;

        self.stage.put(&key, upload.bytes, PDF_MIME).await?;

        let resume = Resume {
            id: Uuid::new_v4(),
            file_name,
            original_name: upload.original_name,
            file_path: key,
            file_size,
            mime_type: upload.mime_type,
            is_active: true,
            uploaded_by: Some(uploader),
            uploaded_at: now,
            updated_at: now,
        };

        if let Err(e) = self.store.insert_active(&resume).await {
            if let Err(cleanup) = self.stage.remove(&resume.file_path).await {
                warn!("Failed to remove orphaned resume blob {}: {cleanup}", resume.file_name);
            }
            return Err(e);
        }

        info!(
            "Uploaded resume {} ({} bytes) as {}",
            resume.id, resume.file_size, resume.file_name
        );
        Ok(resume)
    }

    pub async fn activate(&self, id: Uuid) -> Result<Resume, AppError> {
        let resume = self
            .store
            .activate(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;
        info!("Activated resume {id}");
        Ok(resume)
    }

    /// Removes the blob (best effort) and then the record.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let resume = self
            .store
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;

        match self.stage.remove(&resume.file_path).await {
            Ok(true) => {}
            Ok(false) => warn!("Resume blob for {id} was already missing"),
            Err(e) => warn!("Failed to remove resume blob for {id}: {e}"),
        }

        if !self.store.delete(id).await? {
            return Err(AppError::NotFound("Resume not found".to_string()));
        }
        info!("Deleted resume {id}");
        Ok(())
    }

    /// Works for inactive resumes too.
    pub async fn download(&self, id: Uuid) -> Result<ResumeDownload, AppError> {
        let resume = self
            .store
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;

        let bytes = self
            .stage
            .get(&resume.file_path)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        Ok(ResumeDownload {
            bytes,
            original_name: resume.original_name,
        })
    }
}

fn validate_upload(upload: &ResumeUpload) -> Result<(), AppError> {
    if upload.mime_type != PDF_MIME {
        return Err(AppError::Validation(
            "Only PDF files are allowed".to_string(),
        ));
    }
    if upload.bytes.len() > MAX_RESUME_BYTES {
        return Err(AppError::Validation(format!(
            "File too large: limit is {} MiB",
            MAX_RESUME_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}
