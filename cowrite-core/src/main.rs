use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use cowrite::config::BackupConfig;
use cowrite::server;
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about)]
struct ServerArgs {
    #[clap(short, long)]
    log_level: Option<String>,
    #[clap(short, long, default_value = "3000")]
    port: u16,
    #[clap(short, long, default_value = "cowrite.db")]
    database: String,
    /// Overrides MEDIA_UPLOAD_DIR
    #[clap(long)]
    media_dir: Option<PathBuf>,
    #[clap(long)]
    cors_origin: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = ServerArgs::parse();
    setup_logging(&args.log_level);

    let mut config = BackupConfig::from_env();
    if let Some(media_dir) = args.media_dir {
        config = config.with_media_dir(media_dir);
    }

    info!("Starting server on port {}", args.port);
    server::start_server(
        args.port,
        &args.database,
        config,
        args.cors_origin.as_deref(),
    )
    .await?;

    Ok(())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_deref()
        .unwrap_or("info")
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("sqlx=warn,{}", log_level)))
        .init();
}
