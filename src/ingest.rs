// src/ingest.rs - Batch ingestion: folder of PDFs -> parsed reports -> database
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::db::{self, DbPool};
use crate::parser::parse_report;
use crate::pdf_extractor::PDFExtractor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentOutcome {
    Stored { well_id: i64, stimulations: usize },
    SkippedNoText,
    SkippedNoApi,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl IngestSummary {
    fn record(&mut self, outcome: &Result<DocumentOutcome>) {
        match outcome {
            Ok(DocumentOutcome::Stored { .. }) => self.processed += 1,
            Ok(_) => self.skipped += 1,
            Err(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.processed + self.skipped + self.failed
    }
}

/// Every `*.pdf` under `dir` (any letter case), recursively, in path order.
pub fn collect_pdf_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("Input directory {} does not exist", dir.display());
    }

    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let entries = match fs::read_dir(&current) {
            Ok(entries) => entries,
            Err(e) if current.as_path() == dir => {
                return Err(e).with_context(|| format!("Failed to read {}", dir.display()));
            }
            Err(e) => {
                warn!("Skipping unreadable directory {}: {}", current.display(), e);
                continue;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if is_pdf(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Parses already-extracted report text and stores it.
pub async fn ingest_text(pool: &DbPool, text: &str, source: &str) -> Result<DocumentOutcome> {
    if text.trim().is_empty() {
        warn!("⚠️  No text extracted from {}, skipping", source);
        return Ok(DocumentOutcome::SkippedNoText);
    }

    let report = parse_report(text);
    let Some(api) = report.well.api.clone() else {
        warn!("⚠️  No API number found in {}, skipping", source);
        return Ok(DocumentOutcome::SkippedNoApi);
    };

    let well_id = db::store_report(pool, &report)
        .await
        .with_context(|| format!("Failed to store {}", source))?;

    info!(
        "💾 Stored well {} (id {}) with {} stimulation record(s) from {}",
        api,
        well_id,
        report.stimulations.len(),
        source
    );

    Ok(DocumentOutcome::Stored {
        well_id,
        stimulations: report.stimulations.len(),
    })
}

pub async fn ingest_document(
    pool: &DbPool,
    extractor: &PDFExtractor,
    path: &Path,
) -> Result<DocumentOutcome> {
    let pages = extractor.extract_file(path).await?;
    let text = pages.join("\n");
    ingest_text(pool, &text, &path.display().to_string()).await
}

/// Ingests every PDF under `dir`. A failing document is logged and counted;
/// only a missing or unreadable input directory aborts the run.
pub async fn run_batch(pool: &DbPool, extractor: &PDFExtractor, dir: &Path) -> Result<IngestSummary> {
    let files = collect_pdf_files(dir)?;
    info!("📂 Found {} PDF file(s) in {}", files.len(), dir.display());

    let mut summary = IngestSummary::default();

    for (index, path) in files.iter().enumerate() {
        info!("[{}/{}] {}", index + 1, files.len(), path.display());

        let outcome = ingest_document(pool, extractor, path).await;
        if let Err(e) = &outcome {
            error!("❌ Failed to ingest {}: {:#}", path.display(), e);
        }
        summary.record(&outcome);
    }

    info!(
        "✅ Ingestion finished: {} processed, {} skipped, {} failed",
        summary.processed, summary.skipped, summary.failed
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"%PDF-1.4 placeholder").unwrap();
    }

    #[test]
    fn test_collects_nested_pdfs_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.pdf"));
        touch(&dir.path().join("a.PDF"));
        touch(&dir.path().join("nested/deeper/c.Pdf"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("pdf"));

        let files = collect_pdf_files(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();

        assert_eq!(names, vec!["a.PDF", "b.pdf", "nested/deeper/c.Pdf"]);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(collect_pdf_files(&missing).is_err());
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = IngestSummary::default();
        summary.record(&Ok(DocumentOutcome::Stored {
            well_id: 1,
            stimulations: 2,
        }));
        summary.record(&Ok(DocumentOutcome::SkippedNoApi));
        summary.record(&Ok(DocumentOutcome::SkippedNoText));
        summary.record(&Err(anyhow::anyhow!("boom")));

        assert_eq!(
            summary,
            IngestSummary {
                processed: 1,
                skipped: 2,
                failed: 1
            }
        );
        assert_eq!(summary.total(), 4);
    }

    #[tokio::test]
    async fn test_batch_continues_past_unreadable_documents() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("broken-1.pdf"));
        touch(&dir.path().join("sub/broken-2.pdf"));

        let pool = db::connect("sqlite::memory:").await.unwrap();
        let extractor = PDFExtractor::new(20, None);

        let summary = run_batch(&pool, &extractor, dir.path()).await.unwrap();

        assert_eq!(summary.total(), 2);
        assert_eq!(summary.processed, 0);
        assert!(db::list_wells_with_stimulations(&pool).await.unwrap().is_empty());
    }
}
