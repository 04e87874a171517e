use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::auth::store::AdminPrincipal;
use crate::errors::AppError;
use crate::state::AppState;

/// Guard for the admin route group.
///
/// Validates the bearer token and re-resolves the admin on every request, then
/// exposes the `AdminPrincipal` to handlers through request extensions.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request).ok_or(AppError::Unauthorized)?;
    let claims = state.tokens.validate(token)?;

    let admin = state
        .admins
        .find_by_id(claims.sub)
        .await?
        .ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(AdminPrincipal::from(&admin));
    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<&str> {
    let header = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then_some(token)
}
