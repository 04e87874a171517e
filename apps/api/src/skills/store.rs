use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::skills::model::{Skill, SkillCategory, SkillPatch, SkillRow};

/// Persistence seam for skills. Carried in `AppState` as `Arc<dyn SkillStore>`.
#[async_trait]
pub trait SkillStore: Send + Sync {
    /// All skills, or only active ones. No ordering guarantee.
    async fn list(&self, active_only: bool) -> Result<Vec<Skill>, AppError>;

    async fn max_order(&self, category: SkillCategory) -> Result<Option<i32>, AppError>;

    async fn insert(&self, skill: &Skill) -> Result<(), AppError>;

    /// Applies the patch and refreshes `updated_at`. `None` if the id is unknown.
    async fn update(&self, id: Uuid, patch: &SkillPatch) -> Result<Option<Skill>, AppError>;

    /// Returns false if the id is unknown.
    async fn set_order(&self, id: Uuid, order: i32) -> Result<bool, AppError>;

    /// Returns false if the id is unknown.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    async fn count(&self) -> Result<i64, AppError>;
}

#[derive(Clone)]
pub struct PgSkillStore {
    pool: PgPool,
}

impl PgSkillStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_skill(row: SkillRow) -> Result<Skill, AppError> {
    Skill::try_from(row).map_err(|e| AppError::Internal(anyhow::anyhow!(e)))
}

#[async_trait]
impl SkillStore for PgSkillStore {
    async fn list(&self, active_only: bool) -> Result<Vec<Skill>, AppError> {
        let rows = sqlx::query_as::<_, SkillRow>(
            r#"
            SELECT * FROM skills
            WHERE ($1 = FALSE OR is_active)
            ORDER BY category ASC, sort_order ASC, created_at ASC
            "#,
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(into_skill).collect()
    }

    async fn max_order(&self, category: SkillCategory) -> Result<Option<i32>, AppError> {
        let max: Option<i32> =
            sqlx::query_scalar("SELECT MAX(sort_order) FROM skills WHERE category = $1")
                .bind(category.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(max)
    }

    async fn insert(&self, skill: &Skill) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO skills
                (id, skill_name, percentage, category, sort_order, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(skill.id)
        .bind(&skill.skill_name)
        .bind(skill.percentage)
        .bind(skill.category.as_str())
        .bind(skill.order)
        .bind(skill.is_active)
        .bind(skill.created_at)
        .bind(skill.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, id: Uuid, patch: &SkillPatch) -> Result<Option<Skill>, AppError> {
        let row = sqlx::query_as::<_, SkillRow>(
            r#"
            UPDATE skills SET
                skill_name = COALESCE($2, skill_name),
                percentage = COALESCE($3, percentage),
                category   = COALESCE($4, category),
                is_active  = COALESCE($5, is_active),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.skill_name.as_deref())
        .bind(patch.percentage)
        .bind(patch.category.map(|c| c.as_str()))
        .bind(patch.is_active)
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_skill).transpose()
    }

    async fn set_order(&self, id: Uuid, order: i32) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE skills SET sort_order = $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(order)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM skills WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM skills")
            .fetch_one(&self.pool)
            .await?)
    }
}
