// src/ocr.rs - Page rasterization (PDFium) and OCR (tesseract)
use anyhow::{anyhow, bail, Context, Result};
use image::{DynamicImage, ImageFormat};
use pdfium_render::prelude::*;
use std::path::Path;
use std::process::Command;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::config::OcrConfig;

/// Turns pages of a PDF into text by rendering them and running OCR.
pub trait OcrBackend: Send + Sync {
    /// Number of pages in the document, as seen by the rasterizer.
    fn page_count(&self, pdf_data: &[u8]) -> Result<usize>;

    /// Recognizes the given zero-based pages. The outer error means the
    /// document could not be opened at all; inner errors are per page.
    fn recognize_pages(&self, pdf_data: &[u8], pages: &[usize]) -> Result<Vec<Result<String>>>;
}

pub struct PdfiumTesseract {
    config: OcrConfig,
}

impl PdfiumTesseract {
    pub fn new(config: OcrConfig) -> Self {
        info!(
            "Initializing OCR backend (PDFium + {} @ {} dpi)",
            config.tesseract_cmd, config.dpi
        );
        Self { config }
    }

    /// Check if the tesseract executable can be launched.
    pub fn is_available(&self) -> bool {
        Command::new(&self.config.tesseract_cmd)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn bind_pdfium(&self) -> Result<Pdfium> {
        let bindings = match &self.config.pdfium_lib_path {
            Some(path) => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(path))
                    .or_else(|_| Pdfium::bind_to_system_library())
            }
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| anyhow!("Failed to load PDFium library: {}", e))?;

        Ok(Pdfium::new(bindings))
    }

    fn run_tesseract(&self, image_path: &Path) -> Result<String> {
        let output = Command::new(&self.config.tesseract_cmd)
            .arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.config.language)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    anyhow!(
                        "tesseract not found at '{}'. Install tesseract-ocr or set TESSERACT_CMD",
                        self.config.tesseract_cmd
                    )
                } else {
                    anyhow!("Failed to run tesseract: {}", e)
                }
            })?;

        if !output.status.success() {
            bail!(
                "tesseract failed with exit code {}: {}",
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn render_config(&self) -> PdfRenderConfig {
        PdfRenderConfig::new().scale_page_by_factor(self.config.dpi as f32 / 72.0)
    }
}

impl OcrBackend for PdfiumTesseract {
    fn page_count(&self, pdf_data: &[u8]) -> Result<usize> {
        let pdfium = self.bind_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf_data, None)
            .map_err(|e| anyhow!("PDFium could not open document: {}", e))?;
        Ok(document.pages().len() as usize)
    }

    fn recognize_pages(&self, pdf_data: &[u8], pages: &[usize]) -> Result<Vec<Result<String>>> {
        let pdfium = self.bind_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf_data, None)
            .map_err(|e| anyhow!("PDFium could not open document: {}", e))?;
        let render_config = self.render_config();

        let results = pages
            .iter()
            .map(|&index| -> Result<String> {
                let page_index = PdfPageIndex::try_from(index)
                    .with_context(|| format!("Page index {} out of range", index))?;
                let page = document
                    .pages()
                    .get(page_index)
                    .map_err(|e| anyhow!("Page {} not found: {}", index + 1, e))?;
                let image = page
                    .render_with_config(&render_config)
                    .map_err(|e| anyhow!("Failed to render page {}: {}", index + 1, e))?
                    .as_image();

                let png = write_page_image(&image)
                    .with_context(|| format!("Failed to write page {} image", index + 1))?;

                let text = self.run_tesseract(png.path())?;
                debug!("OCR page {}: {} chars", index + 1, text.len());
                Ok(text)
            })
            .collect();

        Ok(results)
    }
}

/// Writes a rendered page as a grayscale PNG that tesseract can read. The file
/// is removed when the handle drops.
pub fn write_page_image(image: &DynamicImage) -> Result<NamedTempFile> {
    let file = tempfile::Builder::new()
        .prefix("well-page-")
        .suffix(".png")
        .tempfile()
        .context("Failed to create temp image")?;

    image
        .to_luma8()
        .save_with_format(file.path(), ImageFormat::Png)
        .context("Failed to encode page image")?;

    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_image_is_written_as_png() {
        let page = DynamicImage::new_rgba8(8, 6);

        let file = write_page_image(&page).unwrap();

        let bytes = std::fs::read(file.path()).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));

        let decoded = image::open(file.path()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
    }

    #[test]
    fn missing_tesseract_is_reported_by_name() {
        let backend = PdfiumTesseract::new(OcrConfig {
            tesseract_cmd: "definitely-not-tesseract-binary".to_string(),
            ..OcrConfig::default()
        });

        assert!(!backend.is_available());
        let err = backend.run_tesseract(Path::new("missing.png")).unwrap_err();
        assert!(err.to_string().contains("definitely-not-tesseract-binary"));
    }
}
