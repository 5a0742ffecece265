use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use tracing::{debug, error, info};

use crate::error::{AppError, AppResult};
use crate::middleware::request_id;
use crate::models::{ExtractResponse, SummarizeResponse, SummaryLength, UploadedFile};
use crate::state::AppContext;

/// Fields read from the multipart form.
struct UploadForm {
    file: UploadedFile,
    length: Option<String>,
}

pub async fn extract_handler(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> AppResult<Json<ExtractResponse>> {
    let start = Instant::now();
    let request_id = request_id(&headers).unwrap_or_default();

    info!(request_id = %request_id, "Starting extraction request");

    let form = read_upload(&mut multipart).await.map_err(|e| {
        error!(request_id = %request_id, error = %e, "Failed to read upload");
        e
    })?;

    let text = run_extraction(&ctx, form.file, &request_id).await?;
    let response = ExtractResponse::new(&text);

    info!(
        request_id = %request_id,
        text_length = text.chars().count(),
        returned_length = response.text.chars().count(),
        total_time_ms = start.elapsed().as_millis() as u64,
        "Extraction request completed"
    );

    Ok(Json(response))
}

pub async fn summarize_handler(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> AppResult<Json<SummarizeResponse>> {
    let start = Instant::now();
    let request_id = request_id(&headers).unwrap_or_default();

    info!(request_id = %request_id, "Starting summarization request");

    let form = read_upload(&mut multipart).await.map_err(|e| {
        error!(request_id = %request_id, error = %e, "Failed to read upload");
        e
    })?;

    let length = form
        .length
        .as_deref()
        .map(SummaryLength::parse_or_default)
        .unwrap_or_default();

    let text = run_extraction(&ctx, form.file, &request_id).await?;

    let summary = match ctx.summaries.summarize(&text, length).await {
        Ok(summary) => summary,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "Summarization failed");
            return Err(e);
        }
    };

    info!(
        request_id = %request_id,
        length = %length,
        model_used = ctx.summaries.is_model_available(),
        summary_length = summary.chars().count(),
        total_time_ms = start.elapsed().as_millis() as u64,
        "Summarization request completed"
    );

    Ok(Json(SummarizeResponse::new(&text, summary)))
}

/// Runs the blocking extraction pipeline off the async workers.
async fn run_extraction(ctx: &AppContext, file: UploadedFile, request_id: &str) -> AppResult<String> {
    let start = Instant::now();
    let file_name = file.name.clone();
    let extractor = Arc::clone(&ctx.extractor);

    let result = tokio::task::spawn_blocking(move || extractor.extract(&file)).await?;

    match result {
        Ok(text) => {
            info!(
                request_id = %request_id,
                file_name = %file_name,
                text_length = text.len(),
                processing_time_ms = start.elapsed().as_millis() as u64,
                "Text extraction completed"
            );
            Ok(text)
        }
        Err(e) => {
            error!(request_id = %request_id, file_name = %file_name, error = %e, "Text extraction failed");
            Err(e)
        }
    }
}

async fn read_upload(multipart: &mut Multipart) -> AppResult<UploadForm> {
    let mut file = None;
    let mut length = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error("Failed to read multipart field", e))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(|ct| ct.to_string());

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| upload_error("Failed to read file data", e))?;

                if data.is_empty() {
                    return Err(AppError::InvalidFile {
                        message: "File is empty".to_string(),
                    });
                }

                let mut upload = UploadedFile::new(file_name, data);
                if let Some(mime_type) = content_type {
                    upload = upload.with_mime_type(mime_type);
                }

                debug!(
                    "Extracted file: {} ({} bytes, type: {:?})",
                    upload.name,
                    upload.size,
                    upload.mime_type
                );
                file = Some(upload);
            }
            "length" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| upload_error("Failed to read length field", e))?;
                length = Some(value);
            }
            other => {
                debug!(field = other, "Ignoring unexpected multipart field");
            }
        }
    }

    let file = file.ok_or(AppError::MissingFile)?;
    Ok(UploadForm { file, length })
}

/// Body-limit rejections keep their 413; every other multipart failure is a bad upload.
fn upload_error(context: &str, err: MultipartError) -> AppError {
    let message = format!("{}: {}", context, err.body_text());
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge { message }
    } else {
        AppError::InvalidFile { message }
    }
}
