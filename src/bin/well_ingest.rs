// src/bin/well_ingest.rs - Batch ingestion of well completion PDFs
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use well_report_ingest::config::Config;
use well_report_ingest::db;
use well_report_ingest::ingest;
use well_report_ingest::pdf_extractor::PDFExtractor;

/// Extract well and stimulation data from a folder of PDF reports
#[derive(Parser, Debug)]
#[command(name = "well-ingest", version, about)]
struct Cli {
    /// Folder to search (recursively) for PDF files [default: PDF_DIR or ./pdfs]
    folder: Option<PathBuf>,

    /// Database URL [default: DATABASE_URL or sqlite://wells.db?mode=rwc]
    #[arg(long)]
    database_url: Option<String>,

    /// Only use the PDF text layer; never rasterize pages for OCR
    #[arg(long)]
    no_ocr: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    well_report_ingest::init_tracing();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(folder) = cli.folder {
        config.pdf_dir = folder;
    }
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }
    if cli.no_ocr {
        config.ocr.enabled = false;
    }

    info!("🛢️  Starting well report ingestion");
    config.log_summary();

    let pool = db::connect(&config.database_url).await?;
    let extractor = PDFExtractor::from_config(&config);

    ingest::run_batch(&pool, &extractor, &config.pdf_dir).await?;

    pool.close().await;
    Ok(())
}
