use chrono::{DateTime, Utc};
use reqwest::{multipart, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::session::Session;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Not logged in. Run `portfolio-admin login` first.")]
    NotLoggedIn,

    #[error("Session expired or revoked. Run `portfolio-admin login` again.")]
    Unauthorized,

    #[error("{message} ({status})")]
    Api { status: StatusCode, message: String },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Session(#[from] anyhow::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminUser {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: AdminUser,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    pub skill_name: String,
    pub percentage: i32,
    pub category: String,
    pub order: i32,
    pub is_active: bool,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderUpdate {
    pub id: String,
    pub order: i32,
}

#[derive(Debug, Deserialize)]
pub struct ReorderResult {
    pub updated: usize,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    pub id: String,
    pub original_name: String,
    pub file_size: i64,
    #[serde(default)]
    pub is_active: bool,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ResumeEnvelope {
    resume: Resume,
}

/// Thin HTTP client for the portfolio API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    pub async fn me(&self, session: &mut Session) -> Result<AdminUser, ClientError> {
        let request = self.http.get(self.url("/auth/me"));
        Ok(self.authorized(session, request).await?.json().await?)
    }

    pub async fn list_skills(&self, session: &mut Session) -> Result<Vec<Skill>, ClientError> {
        let request = self.http.get(self.url("/skills/admin"));
        Ok(self.authorized(session, request).await?.json().await?)
    }

    pub async fn create_skill(
        &self,
        session: &mut Session,
        name: &str,
        percentage: i64,
        category: &str,
    ) -> Result<Skill, ClientError> {
        let request = self.http.post(self.url("/skills")).json(&json!({
            "skillName": name,
            "percentage": percentage,
            "category": category,
        }));
        Ok(self.authorized(session, request).await?.json().await?)
    }

    pub async fn update_skill(
        &self,
        session: &mut Session,
        id: &str,
        changes: &SkillChanges,
    ) -> Result<Skill, ClientError> {
        let request = self.http.put(self.url(&format!("/skills/{id}"))).json(changes);
        Ok(self.authorized(session, request).await?.json().await?)
    }

    pub async fn delete_skill(&self, session: &mut Session, id: &str) -> Result<(), ClientError> {
        let request = self.http.delete(self.url(&format!("/skills/{id}")));
        self.authorized(session, request).await?;
        Ok(())
    }

    pub async fn reorder_skills(
        &self,
        session: &mut Session,
        updates: &[OrderUpdate],
    ) -> Result<ReorderResult, ClientError> {
        let request = self
            .http
            .put(self.url("/skills/reorder"))
            .json(&json!({ "skills": updates }));
        Ok(self.authorized(session, request).await?.json().await?)
    }

    pub async fn list_resumes(&self, session: &mut Session) -> Result<Vec<Resume>, ClientError> {
        let request = self.http.get(self.url("/resume/admin"));
        Ok(self.authorized(session, request).await?.json().await?)
    }

    pub async fn upload_resume(
        &self,
        session: &mut Session,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Resume, ClientError> {
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")?;
        let form = multipart::Form::new().part("resume", part);
        let request = self.http.post(self.url("/resume/upload")).multipart(form);
        let envelope: ResumeEnvelope = self.authorized(session, request).await?.json().await?;
        Ok(envelope.resume)
    }

    pub async fn activate_resume(
        &self,
        session: &mut Session,
        id: &str,
    ) -> Result<Resume, ClientError> {
        let request = self.http.put(self.url(&format!("/resume/{id}/activate")));
        let envelope: ResumeEnvelope = self.authorized(session, request).await?.json().await?;
        Ok(envelope.resume)
    }

    pub async fn delete_resume(&self, session: &mut Session, id: &str) -> Result<(), ClientError> {
        let request = self.http.delete(self.url(&format!("/resume/{id}")));
        self.authorized(session, request).await?;
        Ok(())
    }

    /// Downloads are public; no session needed.
    pub async fn download_resume(&self, id: &str) -> Result<Vec<u8>, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/resume/download/{id}")))
            .send()
            .await?;
        Ok(ensure_success(response).await?.bytes().await?.to_vec())
    }

    /// Sends `request` with the session's bearer token. A 401 erases the session.
    async fn authorized(
        &self,
        session: &mut Session,
        request: RequestBuilder,
    ) -> Result<Response, ClientError> {
        let token = session.token().ok_or(ClientError::NotLoggedIn)?;
        let response = request.bearer_auth(token).send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            session.invalidate()?;
            return Err(ClientError::Unauthorized);
        }
        ensure_success(response).await
    }
}

async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&text)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| {
            if text.is_empty() {
                status.canonical_reason().unwrap_or("Request failed").to_string()
            } else {
                text
            }
        });
    Err(ClientError::Api { status, message })
}
