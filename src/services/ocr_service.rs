use std::io::Cursor;
use std::process::Command;
use std::sync::Arc;
use std::time::Instant;

use image::metadata::Orientation;
use image::{DynamicImage, GrayImage, ImageDecoder, ImageFormat, ImageReader};
use tempfile::Builder;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Tesseract flags: default LSTM engine, single uniform block of text.
const TESSERACT_ARGS: [&str; 4] = ["--oem", "3", "--psm", "6"];

/// An external engine that turns a prepared grayscale image into text.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &GrayImage) -> AppResult<String>;

    fn is_available(&self) -> bool;
}

/// Runs the `tesseract` executable found on the OS path.
pub struct TesseractEngine {
    command: String,
}

impl TesseractEngine {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.tesseract_cmd.clone())
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image: &GrayImage) -> AppResult<String> {
        let start = Instant::now();

        let staged = Builder::new()
            .prefix("docsum-ocr-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| AppError::ocr(format!("failed to create temporary image: {}", e)))?;

        image
            .save_with_format(staged.path(), ImageFormat::Png)
            .map_err(|e| AppError::ocr(format!("failed to stage image for OCR: {}", e)))?;

        let output = Command::new(&self.command)
            .arg(staged.path())
            .arg("stdout")
            .args(TESSERACT_ARGS)
            .output()
            .map_err(|e| AppError::ocr(format!("failed to run '{}': {}", self.command, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = %output.status, "tesseract exited unsuccessfully");
            return Err(AppError::ocr(format!(
                "'{}' exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(
            width = image.width(),
            height = image.height(),
            text_length = text.len(),
            processing_time_ms = start.elapsed().as_millis() as u64,
            "tesseract recognition finished"
        );
        Ok(text)
    }

    fn is_available(&self) -> bool {
        Command::new(&self.command)
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

/// Image side of extraction: decode, normalize, recognize.
#[derive(Clone)]
pub struct OcrService {
    engine: Arc<dyn OcrEngine>,
}

impl OcrService {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self { engine }
    }

    pub fn is_available(&self) -> bool {
        self.engine.is_available()
    }

    /// Extracts text from encoded image bytes (PNG, JPEG, TIFF, ...).
    pub fn extract_text_from_image(&self, image_data: &[u8]) -> AppResult<String> {
        let image = decode_oriented(image_data)?;
        self.recognize(&image)
    }

    /// Runs OCR on an already-decoded image, e.g. a rasterized PDF page.
    pub fn recognize(&self, image: &DynamicImage) -> AppResult<String> {
        let prepared = normalize(image);
        let text = self.engine.recognize(&prepared)?;
        Ok(text.trim().to_string())
    }
}

/// Decodes an image and applies its EXIF orientation.
pub fn decode_oriented(image_data: &[u8]) -> AppResult<DynamicImage> {
    let reader = ImageReader::new(Cursor::new(image_data))
        .with_guessed_format()
        .map_err(|e| AppError::decode(format!("unreadable image: {}", e)))?;

    let mut decoder = reader.into_decoder()?;
    let orientation = decoder.orientation().unwrap_or_else(|e| {
        debug!(error = %e, "could not read image orientation, assuming upright");
        Orientation::NoTransforms
    });

    let mut image = DynamicImage::from_decoder(decoder)?;
    image.apply_orientation(orientation);
    Ok(image)
}

/// Grayscale conversion followed by contrast stretching.
pub fn normalize(image: &DynamicImage) -> GrayImage {
    let mut gray = image.to_luma8();
    autocontrast(&mut gray);
    gray
}

/// Linearly stretches luminance so the darkest pixel becomes 0 and the
/// brightest 255. Flat images are left untouched. Levels are truncated, not
/// rounded, so output matches PIL's `ImageOps.autocontrast` pixel for pixel.
pub fn autocontrast(image: &mut GrayImage) {
    let (lo, hi) = image
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p.0[0]), hi.max(p.0[0])));

    if hi <= lo {
        return;
    }

    let scale = 255.0 / f64::from(hi - lo);
    let offset = -f64::from(lo) * scale;
    let lut: Vec<u8> = (0..=255u8)
        .map(|level| (f64::from(level) * scale + offset).clamp(0.0, 255.0) as u8)
        .collect();

    for pixel in image.pixels_mut() {
        pixel.0[0] = lut[usize::from(pixel.0[0])];
    }
}
