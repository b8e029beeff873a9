// src/pdf_extractor.rs
use anyhow::{anyhow, Context, Result};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::ocr::{OcrBackend, PdfiumTesseract};

/// Per-page text extraction: native text layer first, OCR for pages whose
/// text layer is missing or too thin.
#[derive(Clone)]
pub struct PDFExtractor {
    min_page_chars: usize,
    ocr: Option<Arc<dyn OcrBackend>>,
}

impl PDFExtractor {
    pub fn new(min_page_chars: usize, ocr: Option<Arc<dyn OcrBackend>>) -> Self {
        Self {
            min_page_chars,
            ocr,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let ocr: Option<Arc<dyn OcrBackend>> = if config.ocr.enabled {
            let backend = PdfiumTesseract::new(config.ocr.clone());
            if !backend.is_available() {
                warn!(
                    "⚠️  '{}' could not be launched; scanned pages will come back empty",
                    config.ocr.tesseract_cmd
                );
            }
            Some(Arc::new(backend))
        } else {
            info!("OCR fallback disabled");
            None
        };
        Self::new(config.min_page_text_chars, ocr)
    }

    /// Reads the file and extracts its pages on the blocking thread pool.
    pub async fn extract_file(&self, path: &Path) -> Result<Vec<String>> {
        let pdf_data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        info!("📖 Extracting text from {} ({} bytes)", path.display(), pdf_data.len());

        let extractor = self.clone();
        tokio::task::spawn_blocking(move || extractor.extract_pages(&pdf_data))
            .await
            .context("PDF extraction task failed")
    }

    /// Never fails: unreadable pages come back as empty strings, and a
    /// document neither backend can open comes back as no pages.
    pub fn extract_pages(&self, pdf_data: &[u8]) -> Vec<String> {
        let native = match text_layer(pdf_data) {
            Ok(pages) => pages.iter().map(|page| self.clean_text(page)).collect(),
            Err(e) => {
                warn!("Failed to open text layer: {}", e);
                Vec::new()
            }
        };

        self.fill_with_ocr(pdf_data, native)
    }

    fn fill_with_ocr(&self, pdf_data: &[u8], mut pages: Vec<String>) -> Vec<String> {
        let Some(ocr) = &self.ocr else {
            return pages;
        };

        if pages.is_empty() {
            match ocr.page_count(pdf_data) {
                Ok(count) => pages = vec![String::new(); count],
                Err(e) => {
                    warn!("Rasterizer could not open document: {}", e);
                    return pages;
                }
            }
        }

        let thin: Vec<usize> = pages
            .iter()
            .enumerate()
            .filter(|(_, text)| self.needs_ocr(text))
            .map(|(index, _)| index)
            .collect();

        if thin.is_empty() {
            return pages;
        }

        info!("🔍 Falling back to OCR for {} of {} page(s)", thin.len(), pages.len());

        match ocr.recognize_pages(pdf_data, &thin) {
            Ok(results) => {
                for (&index, result) in thin.iter().zip(results) {
                    match result {
                        Ok(text) => {
                            let text = self.clean_text(&text);
                            if !text.trim().is_empty() {
                                pages[index] = text;
                            }
                        }
                        Err(e) => warn!("OCR failed for page {}: {}", index + 1, e),
                    }
                }
            }
            Err(e) => warn!("OCR fallback unavailable: {}", e),
        }

        pages
    }

    fn needs_ocr(&self, text: &str) -> bool {
        text.trim().chars().count() < self.min_page_chars
    }

    fn clean_text(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut blank_run = 0;

        for line in text.lines() {
            let line: String = line
                .chars()
                .filter(|c| !c.is_control() || *c == '\t')
                .collect();
            let line = line.trim_end();

            if line.is_empty() {
                blank_run += 1;
                if blank_run > 1 {
                    continue;
                }
            } else {
                blank_run = 0;
            }
            out.push_str(line);
            out.push('\n');
        }

        out.trim_matches('\n').to_string()
    }
}

/// `pdf_extract` can panic on malformed input, so the call is isolated.
fn text_layer(pdf_data: &[u8]) -> Result<Vec<String>> {
    match panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(pdf_data)
    })) {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(anyhow!("PDF text extraction failed: {}", e)),
        Err(_) => Err(anyhow!("PDF text extraction panicked (malformed document)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakeOcr {
        pages: Vec<Option<&'static str>>,
        requested: Mutex<Vec<usize>>,
    }

    impl FakeOcr {
        fn new(pages: Vec<Option<&'static str>>) -> Arc<Self> {
            Arc::new(Self {
                pages,
                requested: Mutex::new(Vec::new()),
            })
        }
    }

    impl OcrBackend for FakeOcr {
        fn page_count(&self, _pdf_data: &[u8]) -> Result<usize> {
            Ok(self.pages.len())
        }

        fn recognize_pages(&self, _pdf_data: &[u8], pages: &[usize]) -> Result<Vec<Result<String>>> {
            self.requested.lock().unwrap().extend_from_slice(pages);
            Ok(pages
                .iter()
                .map(|&i| match self.pages[i] {
                    Some(text) => Ok(text.to_string()),
                    None => Err(anyhow!("unreadable page")),
                })
                .collect())
        }
    }

    struct BrokenOcr;

    impl OcrBackend for BrokenOcr {
        fn page_count(&self, _pdf_data: &[u8]) -> Result<usize> {
            Err(anyhow!("no rasterizer"))
        }

        fn recognize_pages(&self, _pdf_data: &[u8], _pages: &[usize]) -> Result<Vec<Result<String>>> {
            Err(anyhow!("no rasterizer"))
        }
    }

    const LONG_PAGE: &str = "Operator: Continental Resources\nAPI #: 33-053-02102";

    #[test]
    fn only_thin_pages_go_to_ocr() {
        let ocr = FakeOcr::new(vec![Some("unused"), Some("Well Name: Atlanta 14-6H from OCR")]);
        let extractor = PDFExtractor::new(20, Some(ocr.clone()));

        let pages = extractor.fill_with_ocr(b"", vec![LONG_PAGE.to_string(), "  ".to_string()]);

        assert_eq!(pages[0], LONG_PAGE);
        assert_eq!(pages[1], "Well Name: Atlanta 14-6H from OCR");
        assert_eq!(*ocr.requested.lock().unwrap(), vec![1]);
    }

    #[test]
    fn failed_page_degrades_to_empty_and_continues() {
        let ocr = FakeOcr::new(vec![None, Some("Date Stimulated: 05/14/2019 page two")]);
        let extractor = PDFExtractor::new(20, Some(ocr));

        let pages = extractor.fill_with_ocr(b"", vec![String::new(), String::new()]);

        assert_eq!(pages, vec![String::new(), "Date Stimulated: 05/14/2019 page two".to_string()]);
    }

    #[test]
    fn unreadable_text_layer_uses_rasterizer_page_count() {
        let ocr = FakeOcr::new(vec![Some("page one text from the scanner"), None]);
        let extractor = PDFExtractor::new(20, Some(ocr));

        let pages = extractor.extract_pages(b"definitely not a pdf");

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0], "page one text from the scanner");
        assert_eq!(pages[1], "");
    }

    #[test]
    fn no_backend_can_read_document() {
        let without_ocr = PDFExtractor::new(20, None);
        assert!(without_ocr.extract_pages(b"definitely not a pdf").is_empty());

        let broken = PDFExtractor::new(20, Some(Arc::new(BrokenOcr)));
        assert!(broken.extract_pages(b"definitely not a pdf").is_empty());
    }

    #[test]
    fn thin_native_text_survives_when_ocr_is_empty() {
        let ocr = FakeOcr::new(vec![Some("   ")]);
        let extractor = PDFExtractor::new(20, Some(ocr));

        let pages = extractor.fill_with_ocr(b"", vec!["Page 1".to_string()]);

        assert_eq!(pages, vec!["Page 1".to_string()]);
    }

    const TEXT_LAYER_PDF: &[u8] = include_bytes!("../tests/fixtures/text_layer_report.pdf");

    #[test]
    fn text_layer_pdf_skips_ocr() {
        let ocr = FakeOcr::new(vec![Some("should never be used")]);
        let extractor = PDFExtractor::new(20, Some(ocr.clone()));

        let pages = extractor.extract_pages(TEXT_LAYER_PDF);

        assert_eq!(pages.len(), 1);
        assert!(pages[0].contains("Atlanta 14-6H"), "page text: {:?}", pages[0]);
        assert!(pages[0].contains("33-053-02102"), "page text: {:?}", pages[0]);
        assert!(pages[0].contains("-103.730556"), "page text: {:?}", pages[0]);
        assert!(ocr.requested.lock().unwrap().is_empty());
    }

    #[test]
    fn clean_text_keeps_lines() {
        let extractor = PDFExtractor::new(20, None);
        let cleaned = extractor.clean_text("\nOperator: Acme   \r\n\n\n\nAPI: 1\u{7}2\n\n");
        assert_eq!(cleaned, "Operator: Acme\n\nAPI: 12");
    }
}
