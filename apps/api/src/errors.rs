use axum::http::StatusCode;
use thiserror::Error;

use crate::llm_client::GenerationError;
use crate::retrieval::embedder::EmbeddingError;
use crate::storage::FetchError;

/// Pipeline-level error type.
/// Every stage failure collapses into one of these before it reaches the response formatter.
/// The `Display` text is exactly the message the caller sees in `{"error": ...}`.
#[derive(Debug, Error)]
pub enum RoastError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid JSON in request body")]
    MalformedInput { reason: String },

    #[error("PDF appears to be empty or unreadable")]
    UnreadableDocument { reason: String },

    #[error("Failed to download PDF from S3: {0}")]
    Fetch(#[from] FetchError),

    #[error("Failed to embed resume text: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Failed to generate roast: {0}")]
    Generation(#[from] GenerationError),

    #[error("Internal server error: {0}")]
    Unhandled(#[from] anyhow::Error),
}

impl RoastError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        RoastError::MalformedInput {
            reason: reason.into(),
        }
    }

    pub fn unreadable(reason: impl Into<String>) -> Self {
        RoastError::UnreadableDocument {
            reason: reason.into(),
        }
    }

    /// Client-caused failures are 400, everything else is 500.
    pub fn status(&self) -> StatusCode {
        match self {
            RoastError::Validation(_)
            | RoastError::MalformedInput { .. }
            | RoastError::UnreadableDocument { .. } => StatusCode::BAD_REQUEST,
            RoastError::Fetch(_)
            | RoastError::Embedding(_)
            | RoastError::Generation(_)
            | RoastError::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn client_message(&self) -> String {
        self.to_string()
    }

    /// Logs the error at a level matching who caused it.
    pub fn log(&self, request_id: Option<&str>) {
        let request_id = request_id.unwrap_or("-");
        match self {
            RoastError::Validation(msg) => {
                tracing::warn!("Rejected request {request_id}: {msg}");
            }
            RoastError::MalformedInput { reason } => {
                tracing::warn!("Rejected request {request_id}: malformed body: {reason}");
            }
            RoastError::UnreadableDocument { reason } => {
                tracing::warn!("Unreadable document for request {request_id}: {reason}");
            }
            RoastError::Fetch(e) => tracing::error!("S3 error for request {request_id}: {e}"),
            RoastError::Embedding(e) => {
                tracing::error!("Embedding error for request {request_id}: {e}")
            }
            RoastError::Generation(e) => {
                tracing::error!("LLM error for request {request_id}: {e}")
            }
            RoastError::Unhandled(e) => {
                tracing::error!("Internal error for request {request_id}: {e:?}")
            }
        }
    }
}
