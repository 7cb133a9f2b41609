use std::sync::Arc;

use crate::fitment::pipeline::FitmentPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Built once at startup; read-only while requests are served.
    pub pipeline: Arc<FitmentPipeline>,
}
