use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::error::AppResult;
use crate::models::{DocumentKind, UploadedFile};
use crate::services::ocr_service::{OcrEngine, OcrService, TesseractEngine};
use crate::services::pdf_processor::{PageRasterizer, PdfProcessor, PdftoppmRasterizer};

/// Routes an upload to the PDF or image adapter. Blocking; call it from
/// `spawn_blocking` inside async handlers.
#[derive(Clone)]
pub struct DocumentExtractor {
    images: OcrService,
    pdfs: PdfProcessor,
}

impl DocumentExtractor {
    pub fn new(engine: Arc<dyn OcrEngine>, rasterizer: Option<Arc<dyn PageRasterizer>>) -> Self {
        let images = OcrService::new(engine);
        let pdfs = PdfProcessor::new(images.clone(), rasterizer);
        Self { images, pdfs }
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.pdfs = self.pdfs.with_dpi(dpi);
        self
    }

    /// Builds the tesseract/pdftoppm pair. A missing `pdftoppm` only disables
    /// the scanned-PDF fallback; a missing `tesseract` is reported per request.
    pub fn from_config(config: &Config) -> Self {
        let engine = TesseractEngine::from_config(config);
        if engine.is_available() {
            info!(command = %config.tesseract_cmd, "OCR engine available");
        } else {
            tracing::warn!(command = %config.tesseract_cmd, "OCR engine not found, image extraction will fail");
        }

        let rasterizer = PdftoppmRasterizer::from_config(config);
        let rasterizer: Option<Arc<dyn PageRasterizer>> = if rasterizer.is_available() {
            info!(command = %config.pdftoppm_cmd, "PDF rasterizer available");
            Some(Arc::new(rasterizer))
        } else {
            tracing::warn!(command = %config.pdftoppm_cmd, "PDF rasterizer not found, scanned PDFs will extract as blank");
            None
        };

        Self::new(Arc::new(engine), rasterizer).with_dpi(config.raster_dpi)
    }

    pub fn ocr_available(&self) -> bool {
        self.images.is_available()
    }

    pub fn rasterizer_available(&self) -> bool {
        self.pdfs.has_rasterizer()
    }

    pub fn extract(&self, file: &UploadedFile) -> AppResult<String> {
        let kind = file.kind()?;
        info!(
            file_name = %file.name,
            file_size = file.size,
            kind = ?kind,
            "Dispatching document"
        );

        match kind {
            DocumentKind::Pdf => self.pdfs.extract_text(&file.content),
            DocumentKind::Image(_) => self.images.extract_text_from_image(&file.content),
        }
    }
}
