// src/config.rs - Environment driven configuration
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://wells.db?mode=rwc";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub pdf_dir: PathBuf,
    pub ocr: OcrConfig,
    pub min_page_text_chars: usize,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub enabled: bool,
    pub dpi: u32,
    pub language: String,
    pub tesseract_cmd: String,
    pub pdfium_lib_path: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dpi: 300,
            language: "eng".to_string(),
            tesseract_cmd: "tesseract".to_string(),
            pdfium_lib_path: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            port: 8080,
            static_dir: PathBuf::from("static"),
            pdf_dir: PathBuf::from("./pdfs"),
            ocr: OcrConfig::default(),
            min_page_text_chars: 20,
        }
    }
}

impl Config {
    /// Loads `.env` (if present) and reads every setting from the environment,
    /// keeping the default for anything unset or unparsable.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let ocr = OcrConfig {
            enabled: parse_or(&lookup, "OCR_ENABLED", defaults.ocr.enabled),
            dpi: parse_or(&lookup, "OCR_DPI", defaults.ocr.dpi),
            language: lookup("OCR_LANGUAGE").unwrap_or(defaults.ocr.language),
            tesseract_cmd: lookup("TESSERACT_CMD").unwrap_or(defaults.ocr.tesseract_cmd),
            pdfium_lib_path: lookup("PDFIUM_LIB_PATH").map(PathBuf::from),
        };

        Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            port: parse_or(&lookup, "PORT", defaults.port),
            static_dir: lookup("STATIC_DIR").map(PathBuf::from).unwrap_or(defaults.static_dir),
            pdf_dir: lookup("PDF_DIR").map(PathBuf::from).unwrap_or(defaults.pdf_dir),
            ocr,
            min_page_text_chars: parse_or(
                &lookup,
                "MIN_PAGE_TEXT_CHARS",
                defaults.min_page_text_chars,
            ),
        }
    }

    pub fn log_summary(&self) {
        info!("⚙️  Configuration:");
        info!("   Database URL: {}", self.database_url);
        info!("   Port: {}", self.port);
        info!("   Static dir: {}", self.static_dir.display());
        info!("   PDF dir: {}", self.pdf_dir.display());
        info!(
            "   OCR: {} (dpi {}, lang {}, cmd {})",
            if self.ocr.enabled { "Enabled" } else { "Disabled" },
            self.ocr.dpi,
            self.ocr.language,
            self.ocr.tesseract_cmd
        );
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!("Ignoring invalid {}={:?}, using {}", key, raw, default);
                default
            }
        },
        None => default,
    }
}
