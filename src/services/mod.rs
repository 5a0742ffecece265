pub mod extractor;
pub mod ocr_service;
pub mod pdf_processor;
pub mod summarizer;

pub use extractor::DocumentExtractor;
pub use ocr_service::{OcrEngine, OcrService, TesseractEngine};
pub use pdf_processor::{PageRasterizer, PdfProcessor, PdftoppmRasterizer};
pub use summarizer::{HttpSummarizer, Summarizer, SummaryService};
