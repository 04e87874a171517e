use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::routes::{parse_id, MessageResponse};
use crate::skills::model::{OrderUpdate, Skill, SkillGroup};
use crate::skills::repository::SkillUpdate;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSkillRequest {
    pub skill_name: Option<String>,
    pub percentage: Option<i64>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSkillRequest {
    pub skill_name: Option<String>,
    pub percentage: Option<i64>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub skills: Vec<OrderUpdate>,
}

#[derive(Debug, Serialize)]
pub struct ReorderResponse {
    pub message: String,
    pub updated: usize,
    pub missing: Vec<String>,
}

/// GET /api/skills
pub async fn handle_list_public(
    State(state): State<AppState>,
) -> Result<Json<Vec<SkillGroup>>, AppError> {
    Ok(Json(state.skills.list_public().await?))
}

/// GET /api/skills/admin
pub async fn handle_list_all(State(state): State<AppState>) -> Result<Json<Vec<Skill>>, AppError> {
    Ok(Json(state.skills.list_all().await?))
}

/// POST /api/skills
pub async fn handle_create(
    State(state): State<AppState>,
    payload: Result<Json<CreateSkillRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Skill>), AppError> {
    let Json(req) = payload?;
    let (Some(skill_name), Some(percentage), Some(category)) =
        (req.skill_name, req.percentage, req.category)
    else {
        return Err(AppError::Validation(
            "Skill name, percentage, and category are required".to_string(),
        ));
    };

    let skill = state
        .skills
        .create(&skill_name, percentage, &category)
        .await?;
    Ok((StatusCode::CREATED, Json(skill)))
}

/// PUT /api/skills/:id
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateSkillRequest>, JsonRejection>,
) -> Result<Json<Skill>, AppError> {
    let id = parse_id(&id, "Skill")?;
    let Json(req) = payload?;
    let skill = state
        .skills
        .update(
            id,
            SkillUpdate {
                skill_name: req.skill_name,
                percentage: req.percentage,
                category: req.category,
                is_active: req.is_active,
            },
        )
        .await?;
    Ok(Json(skill))
}

/// DELETE /api/skills/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id, "Skill")?;
    state.skills.delete(id).await?;
    Ok(Json(MessageResponse::new("Skill deleted successfully")))
}

/// PUT /api/skills/reorder
pub async fn handle_reorder(
    State(state): State<AppState>,
    payload: Result<Json<ReorderRequest>, JsonRejection>,
) -> Result<Json<ReorderResponse>, AppError> {
    let Json(req) = payload?;
    let outcome = state.skills.reorder(&req.skills).await?;
    Ok(Json(ReorderResponse {
        message: "Skills reordered successfully".to_string(),
        updated: outcome.updated,
        missing: outcome.missing,
    }))
}
