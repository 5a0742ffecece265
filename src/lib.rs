//! Document Summary Service
//!
//! Extracts text from uploaded images and PDFs (embedded text layer, or OCR
//! of rendered pages for scanned documents) and optionally condenses it with
//! an abstractive summarization model.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppContext;
