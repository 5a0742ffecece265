use serde::{Deserialize, Serialize};

/// Maximum characters of extracted text returned by `/extract`.
pub const EXTRACT_TEXT_LIMIT: usize = 8000;

/// Maximum characters of extracted text echoed back by `/summarize`.
pub const SUMMARIZE_TEXT_LIMIT: usize = 1000;

#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub text: String,
    pub summary: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error_kind: String,
    pub message: String,
    pub request_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub services: ServiceAvailability,
    pub summarizer_model: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceAvailability {
    pub ocr_engine: bool,
    pub rasterizer: bool,
    pub summarizer: bool,
}

impl ExtractResponse {
    pub fn new(text: &str) -> Self {
        Self {
            text: truncate_chars(text, EXTRACT_TEXT_LIMIT),
        }
    }
}

impl SummarizeResponse {
    pub fn new(text: &str, summary: String) -> Self {
        Self {
            text: truncate_chars(text, SUMMARIZE_TEXT_LIMIT),
            summary,
        }
    }
}

/// Returns the first `limit` characters of `text` (not bytes).
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
