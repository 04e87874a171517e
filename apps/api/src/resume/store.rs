use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::errors::AppError;
use crate::resume::model::Resume;

/// Advisory lock key serializing every resume mutation.
const RESUME_LOCK_KEY: i64 = 0x7265_7375_6d65; // "resume"

/// Persistence seam for resume metadata. Carried in `AppState` as `Arc<dyn ResumeStore>`.
///
/// `insert_active` and `activate` must leave at most one active resume even
/// when called concurrently.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<Resume>, AppError>;

    async fn find_active(&self) -> Result<Option<Resume>, AppError>;

    /// All resumes, most recently updated first.
    async fn list(&self) -> Result<Vec<Resume>, AppError>;

    /// Deactivates every resume and inserts `resume` as the active one.
    async fn insert_active(&self, resume: &Resume) -> Result<(), AppError>;

    /// Makes `id` the only active resume. `None` (and no change) if unknown.
    async fn activate(&self, id: Uuid) -> Result<Option<Resume>, AppError>;

    /// Returns false if the id is unknown.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin_exclusive(&self) -> Result<Transaction<'static, Postgres>, AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(RESUME_LOCK_KEY)
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn find(&self, id: Uuid) -> Result<Option<Resume>, AppError> {
        Ok(
            sqlx::query_as::<_, Resume>("SELECT * FROM resumes WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_active(&self) -> Result<Option<Resume>, AppError> {
        Ok(sqlx::query_as::<_, Resume>(
            "SELECT * FROM resumes WHERE is_active ORDER BY updated_at DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list(&self) -> Result<Vec<Resume>, AppError> {
        Ok(
            sqlx::query_as::<_, Resume>("SELECT * FROM resumes ORDER BY updated_at DESC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn insert_active(&self, resume: &Resume) -> Result<(), AppError> {
        let mut tx = self.begin_exclusive().await?;

        sqlx::query("UPDATE resumes SET is_active = FALSE WHERE is_active")
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO resumes
                (id, file_name, original_name, file_path, file_size, mime_type,
                 is_active, uploaded_by, uploaded_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7, $8, $9)
            "#,
        )
        .bind(resume.id)
        .bind(&resume.file_name)
        .bind(&resume.original_name)
        .bind(&resume.file_path)
        .bind(resume.file_size)
        .bind(&resume.mime_type)
        .bind(resume.uploaded_by)
        .bind(resume.uploaded_at)
        .bind(resume.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn activate(&self, id: Uuid) -> Result<Option<Resume>, AppError> {
        let mut tx = self.begin_exclusive().await?;

        let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM resumes WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        sqlx::query("UPDATE resumes SET is_active = FALSE WHERE is_active AND id <> $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let resume = sqlx::query_as::<_, Resume>(
            "UPDATE resumes SET is_active = TRUE, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(resume))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM resumes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
