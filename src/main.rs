// src/main.rs - Well map server: JSON API plus the static map client
use anyhow::{Context, Result};
use tracing::info;

use well_report_ingest::api::{self, AppState};
use well_report_ingest::config::Config;
use well_report_ingest::db;

#[tokio::main]
async fn main() -> Result<()> {
    well_report_ingest::init_tracing();

    info!("🚀 Starting Well Report Server");

    let config = Config::from_env();
    config.log_summary();

    let pool = db::connect(&config.database_url).await?;
    let app = api::router(AppState { db: pool }, &config.static_dir);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("✅ Server listening on http://{}", addr);
    info!("📖 API Documentation:");
    info!("   GET  /api/health - Health check");
    info!("   GET  /api/wells - All wells with stimulation data");
    info!("   GET  /api/wells/:api - One well by API number");
    info!("   GET  / - Map client ({})", config.static_dir.display());

    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}
