use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

const PDF_MAGIC: &[u8] = b"%PDF-";

/// A single uploaded document, held in memory for the duration of one request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub size: usize,
    pub content: Bytes,
    pub mime_type: Option<String>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let content = content.into();
        let size = content.len();
        Self {
            name: name.into(),
            size,
            content,
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: String) -> Self {
        self.mime_type = Some(mime_type);
        self
    }

    pub fn has_pdf_suffix(&self) -> bool {
        self.name.to_lowercase().ends_with(".pdf")
    }

    pub fn kind(&self) -> AppResult<DocumentKind> {
        DocumentKind::classify(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image(image::ImageFormat),
}

impl DocumentKind {
    /// Picks the adapter for an upload.
    ///
    /// A `.pdf` name always selects the PDF adapter, even when the bytes turn
    /// out not to be a PDF (the adapter then reports a decode error). Other
    /// names are classified by content: PDF magic first, then image magic.
    pub fn classify(file: &UploadedFile) -> AppResult<Self> {
        if file.has_pdf_suffix() || file.content.starts_with(PDF_MAGIC) {
            return Ok(DocumentKind::Pdf);
        }

        match image::guess_format(&file.content) {
            Ok(format) => Ok(DocumentKind::Image(format)),
            Err(_) => Err(AppError::unsupported(format!(
                "'{}' is neither a PDF nor a recognised image",
                file.name
            ))),
        }
    }
}

/// Summary verbosity requested through the `length` form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl SummaryLength {
    /// Token bounds passed to the model as `(min_length, max_length)`.
    pub fn token_bounds(self) -> (u32, u32) {
        match self {
            SummaryLength::Short => (10, 60),
            SummaryLength::Medium => (30, 150),
            SummaryLength::Long => (60, 250),
        }
    }

    /// Lenient parse used by the form handler: unknown tiers become `Medium`.
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            tracing::warn!(length = value, "Unknown summary length, using medium");
            SummaryLength::Medium
        })
    }
}

impl FromStr for SummaryLength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(SummaryLength::Short),
            "medium" => Ok(SummaryLength::Medium),
            "long" => Ok(SummaryLength::Long),
            other => Err(format!("unknown summary length '{}'", other)),
        }
    }
}

impl fmt::Display for SummaryLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SummaryLength::Short => "short",
            SummaryLength::Medium => "medium",
            SummaryLength::Long => "long",
        };
        f.write_str(name)
    }
}
