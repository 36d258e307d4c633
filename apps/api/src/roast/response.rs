//! Response formatting. Every outcome, success or failure, leaves through
//! [`ResponseEnvelope`] with the same fixed header set.

use axum::{
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::errors::RoastError;

pub const CORS_HEADERS: [(HeaderName, &str); 4] = [
    (header::CONTENT_TYPE, "application/json"),
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type,X-Api-Key"),
    (header::ACCESS_CONTROL_ALLOW_METHODS, "POST,OPTIONS"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoastMetadata {
    pub chunks_processed: usize,
    pub pages_processed: usize,
    pub processing_time_ms: u64,
    pub model_used: String,
    pub embedding_model: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub status: StatusCode,
    pub body: Value,
}

impl ResponseEnvelope {
    pub fn success(request_id: &str, roast: &str, metadata: &RoastMetadata) -> Self {
        Self {
            status: StatusCode::OK,
            body: json!({
                "request_id": request_id,
                "roast": roast,
                "metadata": metadata,
            }),
        }
    }

    pub fn error(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }),
        }
    }

    pub fn from_error(err: &RoastError) -> Self {
        Self::error(err.status(), &err.client_message())
    }

    pub fn headers(&self) -> [(HeaderName, &'static str); 4] {
        CORS_HEADERS
    }
}

impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        let headers = self.headers();
        (self.status, headers, Json(self.body)).into_response()
    }
}
