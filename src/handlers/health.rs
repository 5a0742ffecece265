use axum::{extract::State, http::StatusCode, response::Json};
use tracing::info;

use crate::models::{HealthResponse, ServiceAvailability};
use crate::state::AppContext;

/// Health check endpoint
pub async fn health_handler(State(ctx): State<AppContext>) -> Json<HealthResponse> {
    let ocr_engine = ctx.extractor.ocr_available();
    let rasterizer = ctx.extractor.rasterizer_available();
    let summarizer = ctx.summaries.is_model_available();

    let status = if ocr_engine { "healthy" } else { "degraded" };

    info!(
        status = status,
        ocr_available = ocr_engine,
        rasterizer_available = rasterizer,
        summarizer_available = summarizer,
        "Health check completed"
    );

    Json(HealthResponse {
        status: status.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services: ServiceAvailability {
            ocr_engine,
            rasterizer,
            summarizer,
        },
        summarizer_model: ctx.summaries.model_name().map(str::to_string),
    })
}

/// Readiness check endpoint
pub async fn ready_handler(State(ctx): State<AppContext>) -> StatusCode {
    if ctx.extractor.ocr_available() {
        StatusCode::OK
    } else {
        info!("Readiness check failed - OCR engine unavailable");
        StatusCode::SERVICE_UNAVAILABLE
    }
}
