use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;
use std::time::Instant;

use image::DynamicImage;
use lopdf::Document;
use tempfile::NamedTempFile;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::ocr_service::OcrService;

/// Separator placed between page segments in the extracted text.
pub const SEGMENT_SEPARATOR: &str = "\n\n";

/// Renders PDF pages to raster images for OCR.
pub trait PageRasterizer: Send + Sync {
    /// Returns one image per page, in page order.
    fn rasterize(&self, pdf_data: &[u8], dpi: u32) -> AppResult<Vec<DynamicImage>>;

    fn is_available(&self) -> bool;
}

/// Renders pages with poppler's `pdftoppm`.
pub struct PdftoppmRasterizer {
    command: String,
}

impl PdftoppmRasterizer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.pdftoppm_cmd.clone())
    }
}

impl PageRasterizer for PdftoppmRasterizer {
    fn rasterize(&self, pdf_data: &[u8], dpi: u32) -> AppResult<Vec<DynamicImage>> {
        let start = Instant::now();

        // pdftoppm only reads from disk
        let mut input = NamedTempFile::new().map_err(|e| {
            AppError::rasterization(format!("Failed to create temporary file: {}", e))
        })?;
        input.write_all(pdf_data).map_err(|e| {
            AppError::rasterization(format!("Failed to write PDF to temporary file: {}", e))
        })?;

        let output_dir = tempfile::tempdir().map_err(|e| {
            AppError::rasterization(format!("Failed to create temporary directory: {}", e))
        })?;
        let output_prefix = output_dir.path().join("page");

        let output = Command::new(&self.command)
            .arg("-png")
            .arg("-r")
            .arg(dpi.to_string())
            .arg(input.path())
            .arg(&output_prefix)
            .output()
            .map_err(|e| {
                AppError::rasterization(format!("Failed to run '{}': {}", self.command, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::rasterization(format!(
                "'{}' failed: {}",
                self.command,
                stderr.trim()
            )));
        }

        // Page numbers are zero-padded, so lexical order is page order
        let mut page_files: Vec<PathBuf> = std::fs::read_dir(output_dir.path())?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().map(|ext| ext == "png").unwrap_or(false))
            .collect();
        page_files.sort();

        let pages = page_files
            .iter()
            .map(|path| {
                image::open(path).map_err(|e| {
                    AppError::rasterization(format!(
                        "Failed to load rendered page {}: {}",
                        path.display(),
                        e
                    ))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        tracing::debug!(
            pages = pages.len(),
            dpi = dpi,
            processing_time_ms = start.elapsed().as_millis() as u64,
            "PDF rasterized"
        );
        Ok(pages)
    }

    fn is_available(&self) -> bool {
        // `pdftoppm -v` exits non-zero on some poppler versions
        Command::new(&self.command).arg("-v").output().is_ok()
    }
}

/// PDF side of extraction: embedded text first, OCR of rendered pages when
/// the document has no text layer at all.
#[derive(Clone)]
pub struct PdfProcessor {
    ocr: OcrService,
    rasterizer: Option<Arc<dyn PageRasterizer>>,
    dpi: u32,
}

impl PdfProcessor {
    pub const DEFAULT_DPI: u32 = 200;

    pub fn new(ocr: OcrService, rasterizer: Option<Arc<dyn PageRasterizer>>) -> Self {
        Self {
            ocr,
            rasterizer,
            dpi: Self::DEFAULT_DPI,
        }
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn has_rasterizer(&self) -> bool {
        self.rasterizer.is_some()
    }

    pub fn extract_text(&self, pdf_data: &[u8]) -> AppResult<String> {
        let start = Instant::now();
        tracing::info!("Starting PDF text extraction ({} bytes)", pdf_data.len());

        let document = Document::load_mem(pdf_data)?;
        let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();

        let mut segments = Vec::with_capacity(page_numbers.len());
        for page_number in &page_numbers {
            match document.extract_text(&[*page_number]) {
                Ok(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        segments.push(text.to_string());
                    }
                }
                Err(e) => {
                    tracing::debug!(page = page_number, error = %e, "No text layer on page");
                }
            }
        }

        let mut ocr_used = false;
        if segments.is_empty() {
            match &self.rasterizer {
                Some(rasterizer) => {
                    tracing::info!(
                        pages = page_numbers.len(),
                        dpi = self.dpi,
                        "No embedded text found, falling back to OCR of rendered pages"
                    );
                    ocr_used = true;
                    for page in rasterizer.rasterize(pdf_data, self.dpi)? {
                        let text = self.ocr.recognize(&page)?;
                        if !text.is_empty() {
                            segments.push(text);
                        }
                    }
                }
                None => {
                    tracing::info!("No embedded text and no rasterizer available, treating PDF as blank");
                }
            }
        }

        let text = segments.join(SEGMENT_SEPARATOR).trim().to_string();

        tracing::info!(
            pages = page_numbers.len(),
            ocr_used = ocr_used,
            text_length = text.len(),
            processing_time_ms = start.elapsed().as_millis() as u64,
            "PDF processing completed"
        );
        Ok(text)
    }
}
