use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::store::{Admin, AdminPrincipal};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: AdminPrincipal,
}

#[derive(Debug, Serialize)]
pub struct InitAdminResponse {
    pub message: String,
    pub user: AdminPrincipal,
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(req) = payload?;
    let (Some(email), Some(password)) = (req.email, req.password) else {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    };

    let admin = state.admins.find_by_email(email.trim()).await?;
    let admin = match admin {
        Some(admin) if verify_password(&password, &admin.password_hash) => admin,
        _ => {
            warn!("Failed admin login attempt");
            return Err(AppError::Validation("Invalid credentials".to_string()));
        }
    };

    let token = state.tokens.issue(admin.id, &admin.email)?;
    info!("Admin {} logged in", admin.id);
    Ok(Json(LoginResponse {
        token,
        user: AdminPrincipal::from(&admin),
    }))
}

/// GET /api/auth/me
pub async fn handle_me(Extension(admin): Extension<AdminPrincipal>) -> Json<AdminPrincipal> {
    Json(admin)
}

/// POST /api/auth/init-admin
///
/// Creates the first admin from `ADMIN_EMAIL` / `ADMIN_PASSWORD`. Refuses once any admin exists.
pub async fn handle_init_admin(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<InitAdminResponse>), AppError> {
    if state.admins.count().await? > 0 {
        return Err(AppError::Validation("Admin user already exists".to_string()));
    }

    let (Some(email), Some(password)) = (
        state.config.admin_email.as_deref(),
        state.config.admin_password.as_deref(),
    ) else {
        return Err(AppError::Validation(
            "ADMIN_EMAIL and ADMIN_PASSWORD are not configured".to_string(),
        ));
    };

    let admin = Admin {
        id: Uuid::new_v4(),
        email: email.trim().to_string(),
        password_hash: hash_password(password)?,
        created_at: Utc::now(),
    };
    state.admins.insert(&admin).await?;
    info!("Created initial admin {}", admin.id);

    Ok((
        StatusCode::CREATED,
        Json(InitAdminResponse {
            message: "Admin user created successfully".to_string(),
            user: AdminPrincipal::from(&admin),
        }),
    ))
}
