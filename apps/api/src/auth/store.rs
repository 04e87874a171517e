use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// The authenticated identity attached to a request by the admin guard.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AdminPrincipal {
    pub id: Uuid,
    pub email: String,
}

impl From<&Admin> for AdminPrincipal {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id,
            email: admin.email.clone(),
        }
    }
}

#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Admin>, AppError>;

    /// Emails are matched case-insensitively.
    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, AppError>;

    async fn count(&self) -> Result<i64, AppError>;

    async fn insert(&self, admin: &Admin) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct PgAdminStore {
    pool: PgPool,
}

impl PgAdminStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminStore for PgAdminStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Admin>, AppError> {
        Ok(
            sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, AppError> {
        Ok(
            sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE lower(email) = lower($1)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await?)
    }

    async fn insert(&self, admin: &Admin) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO admins (id, email, password_hash, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(admin.id)
        .bind(&admin.email)
        .bind(&admin.password_hash)
        .bind(admin.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
