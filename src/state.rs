use std::sync::Arc;

use crate::config::Config;
use crate::services::{DocumentExtractor, SummaryService};

/// Collaborator handles built once at startup and shared read-only by every
/// request.
#[derive(Clone)]
pub struct AppContext {
    pub extractor: Arc<DocumentExtractor>,
    pub summaries: Arc<SummaryService>,
}

impl AppContext {
    pub fn new(extractor: DocumentExtractor, summaries: SummaryService) -> Self {
        Self {
            extractor: Arc::new(extractor),
            summaries: Arc::new(summaries),
        }
    }

    pub async fn from_config(config: &Config) -> Self {
        let extractor = DocumentExtractor::from_config(config);
        let summaries = SummaryService::from_config(config).await;
        Self::new(extractor, summaries)
    }
}
