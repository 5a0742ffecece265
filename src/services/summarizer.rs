use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{truncate_chars, SummaryLength};

/// Characters of extracted text handed to the model.
pub const MODEL_INPUT_CHARS: usize = 1000;

/// Characters returned verbatim when no model is available.
pub const FALLBACK_SUMMARY_CHARS: usize = 500;

const WARMUP_TEXT: &str = "The service started and is checking that the summarization model \
    responds. This short passage is only used once at startup.";

/// A pretrained abstractive summarization model.
#[async_trait]
pub trait Summarizer: Send + Sync {
    fn model_name(&self) -> &str;

    async fn summarize(&self, text: &str, length: SummaryLength) -> AppResult<String>;
}

/// Client for an inference endpoint speaking the Hugging Face summarization
/// protocol (`{"inputs", "parameters"}` in, `[{"summary_text"}]` out).
pub struct HttpSummarizer {
    client: Client,
    url: String,
    model: String,
    api_token: Option<String>,
}

#[derive(Serialize)]
struct SummarizationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
    options: InferenceOptions,
}

#[derive(Serialize)]
struct GenerationParameters {
    min_length: u32,
    max_length: u32,
    do_sample: bool,
}

#[derive(Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

#[derive(Deserialize)]
struct SummarizationOutput {
    summary_text: String,
}

impl HttpSummarizer {
    pub fn new(
        url: impl Into<String>,
        model: impl Into<String>,
        api_token: Option<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            model: model.into(),
            api_token,
        })
    }

    /// Connects once at startup and confirms the model answers a warm-up
    /// request. Any failure is reported as `ModelUnavailable`.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let unavailable = || AppError::ModelUnavailable {
            model: config.summarizer_model.clone(),
        };

        let url = config.summarizer_url.clone().ok_or_else(unavailable)?;
        let summarizer = Self::new(
            url,
            config.summarizer_model.clone(),
            config.summarizer_api_token.clone(),
            config.summarizer_timeout(),
        )?;

        summarizer
            .generate(WARMUP_TEXT, SummaryLength::Short)
            .await
            .map_err(|e| {
                error!(model = %config.summarizer_model, error = %e, "Summarizer warm-up failed");
                unavailable()
            })?;

        info!(model = %config.summarizer_model, "Loaded summarizer");
        Ok(summarizer)
    }

    async fn generate(&self, text: &str, length: SummaryLength) -> AppResult<String> {
        let start = Instant::now();
        let (min_length, max_length) = length.token_bounds();

        let body = SummarizationRequest {
            inputs: text,
            parameters: GenerationParameters {
                min_length,
                max_length,
                do_sample: false,
            },
            options: InferenceOptions {
                wait_for_model: true,
            },
        };

        debug!(model = %self.model, length = %length, "Sending summarization request");

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::summarization(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(AppError::summarization(format!(
                "model returned {}: {}",
                status, error_body
            )));
        }

        let outputs: Vec<SummarizationOutput> = response
            .json()
            .await
            .map_err(|e| AppError::summarization(format!("malformed model response: {}", e)))?;

        let summary = outputs
            .into_iter()
            .next()
            .map(|output| output.summary_text)
            .ok_or_else(|| AppError::summarization("model returned no summaries"))?;

        debug!(
            model = %self.model,
            summary_length = summary.len(),
            processing_time_ms = start.elapsed().as_millis() as u64,
            "Summarization finished"
        );
        Ok(summary)
    }
}

#[async_trait]
impl Summarizer for HttpSummarizer {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn summarize(&self, text: &str, length: SummaryLength) -> AppResult<String> {
        self.generate(text, length).await
    }
}

/// Applies the input window and the no-model fallback around an optional
/// summarizer.
#[derive(Clone, Default)]
pub struct SummaryService {
    model: Option<Arc<dyn Summarizer>>,
}

impl SummaryService {
    pub fn new(model: Option<Arc<dyn Summarizer>>) -> Self {
        Self { model }
    }

    pub fn fallback_only() -> Self {
        Self { model: None }
    }

    pub async fn from_config(config: &Config) -> Self {
        match HttpSummarizer::connect(config).await {
            Ok(summarizer) => Self::new(Some(Arc::new(summarizer))),
            Err(e) => {
                error!("Summarizer failed: {}", e);
                Self::fallback_only()
            }
        }
    }

    pub fn is_model_available(&self) -> bool {
        self.model.is_some()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref().map(|model| model.model_name())
    }

    pub async fn summarize(&self, text: &str, length: SummaryLength) -> AppResult<String> {
        let Some(model) = &self.model else {
            return Ok(truncate_chars(text, FALLBACK_SUMMARY_CHARS));
        };

        // Nothing to condense; models reject empty input
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let window = truncate_chars(text, MODEL_INPUT_CHARS);
        model.summarize(&window, length).await
    }
}
