//! Fixtures and fake collaborators shared by the test suites.
#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use docsum::{
    models::SummaryLength,
    services::{OcrEngine, PageRasterizer, Summarizer},
    AppResult,
};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

pub const BOUNDARY: &str = "docsum-test-boundary";

/// OCR engine that returns canned text and counts invocations.
pub struct FakeOcr {
    text: String,
    calls: AtomicUsize,
    last_dimensions: Mutex<Option<(u32, u32)>>,
}

impl FakeOcr {
    pub fn new(text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            text: text.into(),
            calls: AtomicUsize::new(0),
            last_dimensions: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_dimensions(&self) -> Option<(u32, u32)> {
        *self.last_dimensions.lock().unwrap()
    }
}

impl OcrEngine for FakeOcr {
    fn recognize(&self, image: &GrayImage) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_dimensions.lock().unwrap() = Some(image.dimensions());
        Ok(self.text.clone())
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Rasterizer that renders a fixed number of blank pages.
pub struct FakeRasterizer {
    pages: usize,
    calls: AtomicUsize,
    last_dpi: Mutex<Option<u32>>,
}

impl FakeRasterizer {
    pub fn new(pages: usize) -> Arc<Self> {
        Arc::new(Self {
            pages,
            calls: AtomicUsize::new(0),
            last_dpi: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_dpi(&self) -> Option<u32> {
        *self.last_dpi.lock().unwrap()
    }
}

impl PageRasterizer for FakeRasterizer {
    fn rasterize(&self, _pdf_data: &[u8], dpi: u32) -> AppResult<Vec<DynamicImage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_dpi.lock().unwrap() = Some(dpi);
        Ok((0..self.pages)
            .map(|_| DynamicImage::ImageLuma8(GrayImage::from_pixel(40, 20, Luma([255]))))
            .collect())
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Summarizer that records what it was asked to condense.
pub struct FakeSummarizer {
    summary: String,
    inputs: Mutex<Vec<(String, SummaryLength)>>,
}

impl FakeSummarizer {
    pub fn new(summary: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            summary: summary.into(),
            inputs: Mutex::new(Vec::new()),
        })
    }

    pub fn inputs(&self) -> Vec<(String, SummaryLength)> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Summarizer for FakeSummarizer {
    fn model_name(&self) -> &str {
        "fake-summarizer"
    }

    async fn summarize(&self, text: &str, length: SummaryLength) -> AppResult<String> {
        self.inputs.lock().unwrap().push((text.to_string(), length));
        Ok(self.summary.clone())
    }
}

/// Encodes a solid-colour grayscale PNG.
pub fn png_bytes(width: u32, height: u32, luma: u8) -> Vec<u8> {
    encode_image(width, height, luma, ImageFormat::Png)
}

pub fn encode_image(width: u32, height: u32, luma: u8, format: ImageFormat) -> Vec<u8> {
    let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([luma])));
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

/// Builds a PDF with one page per entry; an empty entry yields a page with
/// no text layer.
pub fn pdf_bytes(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let operations = if text.is_empty() {
            Vec::new()
        } else {
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ]
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// A multipart/form-data body with a `file` part and an optional `length`.
pub fn multipart_body(file_name: &str, content: &[u8], length: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(b"\r\n");

    if let Some(length) = length {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"length\"\r\n\r\n");
        body.extend_from_slice(length.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}
