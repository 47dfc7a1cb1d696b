pub mod app;
pub mod handlers;

use anyhow::Result;
use sea_orm_migration::prelude::*;
use tracing::info;

use crate::app_context::AppContext;
use crate::config::BackupConfig;
use crate::database::{establish_connection, get_database_url, migrations::Migrator};

pub async fn start_server(
    port: u16,
    database_path: &str,
    config: BackupConfig,
    cors_origin: Option<&str>,
) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    Migrator::up(&db, None).await?;
    info!("Database migrations completed");

    info!(
        media_dir = %config.media_dir.display(),
        max_upload_bytes = config.max_upload_bytes,
        search = config.search_url.is_some(),
        "backup configuration loaded"
    );
    let app = app::create_app(AppContext::new(db, config), cors_origin)?;

    log_routes();

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn log_routes() {
    info!("API Endpoints:");
    info!("  GET  /health                                - Health check");
    info!("  GET  /backups/projects/:project_id/export   - Download project backup");
    info!("  POST /backups/import                        - Import project backup (multipart `file`)");
}
