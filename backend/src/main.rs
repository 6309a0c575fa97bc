//! Backend entry-point: loads settings, prepares the database and serves the
//! REST API.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

mod server;

use std::sync::Arc;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use qna_backend::domain::migrations::MigrationService;
use qna_backend::inbound::http::health::HealthState;
use qna_backend::inbound::http::session_config::{BuildMode, session_settings};
use qna_backend::outbound::persistence::{DbPool, DieselMigrationStore, migration_catalogue};
use qna_backend::settings::AppSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load()
        .map_err(|error| std::io::Error::other(format!("load settings: {error}")))?;
    let session = session_settings(&settings.session_toggles(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;

    let database_url = settings
        .database_url()
        .ok_or_else(|| std::io::Error::other("database URL missing: set QNA_DATABASE_URL"))?;
    let pool_config = settings
        .pool_config(database_url)
        .map_err(std::io::Error::other)?;
    let pool = DbPool::new(pool_config)
        .await
        .map_err(|error| std::io::Error::other(format!("create database pool: {error}")))?;

    if settings.run_migrations_on_startup {
        migrate_on_startup(&pool).await?;
    }

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
        pool,
    )
    .with_admin_endpoints(settings.admin_endpoints);

    create_server(health_state, config)?.await
}

async fn migrate_on_startup(pool: &DbPool) -> std::io::Result<()> {
    let registry = migration_catalogue::registry().map_err(std::io::Error::other)?;
    let service = MigrationService::new(Arc::new(DieselMigrationStore::new(pool.clone())), registry);
    let executed = service
        .run_all()
        .await
        .map_err(|error| std::io::Error::other(format!("startup migrations failed: {error}")))?;
    info!(count = executed.len(), "startup migrations applied");
    Ok(())
}
