use std::sync::Arc;

use crate::auth::jwt::TokenService;
use crate::auth::store::AdminStore;
use crate::config::Config;
use crate::resume::repository::ResumeRepository;
use crate::skills::repository::SkillRepository;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub skills: SkillRepository,
    pub resumes: ResumeRepository,
    pub admins: Arc<dyn AdminStore>,
    pub tokens: Arc<TokenService>,
    pub config: Config,
}
