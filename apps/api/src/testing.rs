//! In-memory stores and app fixtures for unit and router tests.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tempfile::TempDir;
use uuid::Uuid;

use crate::auth::jwt::TokenService;
use crate::auth::password::hash_password;
use crate::auth::store::{Admin, AdminStore};
use crate::config::Config;
use crate::errors::AppError;
use crate::resume::file_stage::{FileStage, LocalFileStage};
use crate::resume::model::Resume;
use crate::resume::repository::ResumeRepository;
use crate::resume::store::ResumeStore;
use crate::skills::model::{Skill, SkillCategory, SkillPatch};
use crate::skills::repository::SkillRepository;
use crate::skills::store::SkillStore;
use crate::state::AppState;

pub const MULTIPART_BOUNDARY: &str = "portfolio-test-boundary";
const TEST_SECRET: &str = "test-secret-key-for-testing";

#[derive(Default)]
pub struct MemorySkillStore {
    skills: Mutex<Vec<Skill>>,
}

#[async_trait]
impl SkillStore for MemorySkillStore {
    async fn list(&self, active_only: bool) -> Result<Vec<Skill>, AppError> {
        let skills = self.skills.lock().unwrap();
        Ok(skills
            .iter()
            .filter(|s| !active_only || s.is_active)
            .cloned()
            .collect())
    }

    async fn max_order(&self, category: SkillCategory) -> Result<Option<i32>, AppError> {
        let skills = self.skills.lock().unwrap();
        Ok(skills
            .iter()
            .filter(|s| s.category == category)
            .map(|s| s.order)
            .max())
    }

    async fn insert(&self, skill: &Skill) -> Result<(), AppError> {
        self.skills.lock().unwrap().push(skill.clone());
        Ok(())
    }

    async fn update(&self, id: Uuid, patch: &SkillPatch) -> Result<Option<Skill>, AppError> {
        let mut skills = self.skills.lock().unwrap();
        Ok(skills.iter_mut().find(|s| s.id == id).map(|skill| {
            patch.apply(skill);
            skill.updated_at = Utc::now();
            skill.clone()
        }))
    }

    async fn set_order(&self, id: Uuid, order: i32) -> Result<bool, AppError> {
        let mut skills = self.skills.lock().unwrap();
        match skills.iter_mut().find(|s| s.id == id) {
            Some(skill) => {
                skill.order = order;
                skill.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut skills = self.skills.lock().unwrap();
        let before = skills.len();
        skills.retain(|s| s.id != id);
        Ok(skills.len() < before)
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.skills.lock().unwrap().len() as i64)
    }
}

#[derive(Default)]
pub struct MemoryResumeStore {
    resumes: Mutex<Vec<Resume>>,
}

#[async_trait]
impl ResumeStore for MemoryResumeStore {
    async fn find(&self, id: Uuid) -> Result<Option<Resume>, AppError> {
        let resumes = self.resumes.lock().unwrap();
        Ok(resumes.iter().find(|r| r.id == id).cloned())
    }

    async fn find_active(&self) -> Result<Option<Resume>, AppError> {
        let resumes = self.resumes.lock().unwrap();
        Ok(resumes.iter().find(|r| r.is_active).cloned())
    }

    async fn list(&self) -> Result<Vec<Resume>, AppError> {
        let mut resumes = self.resumes.lock().unwrap().clone();
        resumes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(resumes)
    }

    async fn insert_active(&self, resume: &Resume) -> Result<(), AppError> {
        let mut resumes = self.resumes.lock().unwrap();
        for existing in resumes.iter_mut() {
            existing.is_active = false;
        }
        let mut resume = resume.clone();
        resume.is_active = true;
        resumes.push(resume);
        Ok(())
    }

    async fn activate(&self, id: Uuid) -> Result<Option<Resume>, AppError> {
        let mut resumes = self.resumes.lock().unwrap();
        if !resumes.iter().any(|r| r.id == id) {
            return Ok(None);
        }
        let mut activated = None;
        for resume in resumes.iter_mut() {
            if resume.id == id {
                resume.is_active = true;
                resume.updated_at = Utc::now();
                activated = Some(resume.clone());
            } else {
                resume.is_active = false;
            }
        }
        Ok(activated)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut resumes = self.resumes.lock().unwrap();
        let before = resumes.len();
        resumes.retain(|r| r.id != id);
        Ok(resumes.len() < before)
    }
}

#[derive(Default)]
pub struct MemoryAdminStore {
    admins: Mutex<Vec<Admin>>,
}

#[async_trait]
impl AdminStore for MemoryAdminStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Admin>, AppError> {
        let admins = self.admins.lock().unwrap();
        Ok(admins.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, AppError> {
        let admins = self.admins.lock().unwrap();
        Ok(admins
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.admins.lock().unwrap().len() as i64)
    }

    async fn insert(&self, admin: &Admin) -> Result<(), AppError> {
        self.admins.lock().unwrap().push(admin.clone());
        Ok(())
    }
}

/// A file stage whose writes always fail.
pub struct FailingFileStage;

#[async_trait]
impl FileStage for FailingFileStage {
    async fn put(&self, _key: &str, _bytes: Bytes, _content_type: &str) -> Result<(), AppError> {
        Err(AppError::Storage("disk full".to_string()))
    }

    async fn get(&self, _key: &str) -> Result<Option<Bytes>, AppError> {
        Ok(None)
    }

    async fn remove(&self, _key: &str) -> Result<bool, AppError> {
        Ok(false)
    }
}

pub fn test_config(upload_dir: &Path) -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        port: 0,
        cors_origins: Vec::new(),
        upload_dir: upload_dir.to_path_buf(),
        s3: None,
        jwt_secret: TEST_SECRET.to_string(),
        jwt_expiry_hours: 1,
        admin_email: None,
        admin_password: None,
        seed_skills: false,
        rust_log: "debug".to_string(),
    }
}

/// A fully wired `AppState` over in-memory stores and a temporary upload directory.
pub struct TestApp {
    pub state: AppState,
    admins: Arc<MemoryAdminStore>,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(|_| {}).await
    }

    pub async fn with_bootstrap_admin(email: &str, password: &str) -> Self {
        Self::build(|config| {
            config.admin_email = Some(email.to_string());
            config.admin_password = Some(password.to_string());
        })
        .await
    }

    async fn build(customize: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        customize(&mut config);

        let stage = Arc::new(LocalFileStage::new(dir.path()).await.unwrap());
        let admins = Arc::new(MemoryAdminStore::default());
        let state = AppState {
            skills: SkillRepository::new(Arc::new(MemorySkillStore::default())),
            resumes: ResumeRepository::new(Arc::new(MemoryResumeStore::default()), stage),
            admins: admins.clone(),
            tokens: Arc::new(TokenService::new(&config.jwt_secret, config.jwt_expiry_hours)),
            config,
        };

        Self {
            state,
            admins,
            _dir: dir,
        }
    }

    pub async fn create_admin(&self, email: &str, password: &str) -> Admin {
        let admin = Admin {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: hash_password(password).unwrap(),
            created_at: Utc::now(),
        };
        self.admins.insert(&admin).await.unwrap();
        admin
    }

    /// Creates an admin and returns a valid bearer token for it.
    pub async fn admin_token(&self) -> String {
        let admin = self.create_admin("admin@example.com", "password").await;
        self.state.tokens.issue(admin.id, &admin.email).unwrap()
    }
}

/// A single-file `multipart/form-data` body using `MULTIPART_BOUNDARY`.
pub fn multipart_body(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 256);
    body.extend_from_slice(
        format!(
            "--{MULTIPART_BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}
