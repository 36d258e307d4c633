use std::sync::Arc;

use crate::config::PipelineSettings;
use crate::roast::pipeline::Capabilities;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub capabilities: Capabilities,
    pub settings: Arc<PipelineSettings>,
}
