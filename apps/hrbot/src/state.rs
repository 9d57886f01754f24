use std::sync::Arc;

use crate::assistant::Assistant;
use crate::config::Config;
use crate::ingest::IngestionStage;
use crate::vector_store::VectorIndex;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
    pub ingestion: Arc<IngestionStage>,
    /// Same index the engine queries; exposed for health reporting.
    pub index: Arc<dyn VectorIndex>,
    pub config: Config,
}
