use serde_json::Value;

use crate::errors::RoastError;

pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields: s3_bucket, s3_key, request_id";

/// A validated roast request. All three fields are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoastRequest {
    pub s3_bucket: String,
    pub s3_key: String,
    /// Opaque correlation token: used for logging and scratch-file naming only.
    pub request_id: String,
}

/// Parses the raw request body.
///
/// An empty body is read as `{}`. A body that is valid JSON but not an object, or
/// whose fields are missing, empty, or not strings, fails validation.
pub fn parse_request(body: &str) -> Result<RoastRequest, RoastError> {
    let body = if body.trim().is_empty() { "{}" } else { body };
    let value: Value =
        serde_json::from_str(body).map_err(|e| RoastError::malformed(e.to_string()))?;

    match (
        required_field(&value, "s3_bucket"),
        required_field(&value, "s3_key"),
        required_field(&value, "request_id"),
    ) {
        (Some(s3_bucket), Some(s3_key), Some(request_id)) => Ok(RoastRequest {
            s3_bucket,
            s3_key,
            request_id,
        }),
        _ => Err(RoastError::Validation(MISSING_FIELDS_MESSAGE.to_string())),
    }
}

fn required_field(value: &Value, name: &str) -> Option<String> {
    value
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
