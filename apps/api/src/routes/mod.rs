pub mod health;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use uuid::Uuid;

use crate::auth::{handlers as auth, middleware::require_admin};
use crate::config::Config;
use crate::errors::AppError;
use crate::resume::{handlers as resume, model::MAX_RESUME_BYTES};
use crate::skills::handlers as skills;
use crate::state::AppState;

/// Body limit for the upload route. Larger than the file limit so oversized
/// files reach the size check and get a validation error.
const UPLOAD_BODY_LIMIT: usize = 2 * MAX_RESUME_BYTES + 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Unparseable ids cannot match any record.
pub fn parse_id(raw: &str, entity: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("{entity} not found")))
}

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health_handler))
        .route("/auth/login", post(auth::handle_login))
        .route("/auth/init-admin", post(auth::handle_init_admin))
        .route("/skills", get(skills::handle_list_public))
        .route("/resume", get(resume::handle_get_active))
        .route("/resume/download/:id", get(resume::handle_download));

    let admin = Router::new()
        .route("/auth/me", get(auth::handle_me))
        .route("/skills", post(skills::handle_create))
        .route("/skills/admin", get(skills::handle_list_all))
        .route("/skills/reorder", put(skills::handle_reorder))
        .route(
            "/skills/:id",
            put(skills::handle_update).delete(skills::handle_delete),
        )
        .route("/resume/admin", get(resume::handle_list_all))
        .route(
            "/resume/upload",
            post(resume::handle_upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/resume/:id", delete(resume::handle_delete))
        .route("/resume/:id/activate", put(resume::handle_activate))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .nest("/api", public.merge(admin))
        .with_state(state)
}

pub fn build_cors(config: &Config) -> Result<CorsLayer> {
    if config.cors_is_permissive() {
        return Ok(CorsLayer::permissive());
    }

    let origins = config
        .cors_origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).with_context(|| format!("Invalid CORS origin '{o}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]))
}
