mod auth;
mod config;
mod db;
mod errors;
mod resume;
mod routes;
mod skills;
mod state;
#[cfg(test)]
mod testing;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::jwt::TokenService;
use crate::auth::store::PgAdminStore;
use crate::config::{Config, S3Config};
use crate::db::{create_pool, run_migrations};
use crate::resume::file_stage::{FileStage, LocalFileStage, S3FileStage};
use crate::resume::repository::ResumeRepository;
use crate::resume::store::PgResumeStore;
use crate::routes::{build_cors, build_router};
use crate::skills::repository::SkillRepository;
use crate::skills::seed::seed_defaults;
use crate::skills::store::PgSkillStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http=info",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Portfolio API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    // Resume blobs: S3 / MinIO when configured, local disk otherwise
    let stage: Arc<dyn FileStage> = match &config.s3 {
        Some(s3) => {
            let client = build_s3_client(s3).await;
            info!("S3 file stage initialized (bucket: {})", s3.bucket);
            Arc::new(S3FileStage::new(client, s3.bucket.clone()))
        }
        None => {
            info!("Local file stage at {}", config.upload_dir.display());
            Arc::new(LocalFileStage::new(config.upload_dir.clone()).await?)
        }
    };

    let state = AppState {
        skills: SkillRepository::new(Arc::new(PgSkillStore::new(db.clone()))),
        resumes: ResumeRepository::new(Arc::new(PgResumeStore::new(db.clone())), stage),
        admins: Arc::new(PgAdminStore::new(db)),
        tokens: Arc::new(TokenService::new(
            &config.jwt_secret,
            config.jwt_expiry_hours,
        )),
        config: config.clone(),
    };

    if config.seed_skills {
        seed_defaults(&state.skills).await?;
    }

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors(&config)?);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(s3: &S3Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &s3.access_key_id,
        &s3.secret_access_key,
        None,
        None,
        "portfolio-static",
    );

    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&s3.endpoint)
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}
