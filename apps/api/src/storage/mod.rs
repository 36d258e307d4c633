//! Object storage — downloads the uploaded resume into local scratch space.

use std::path::Path;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::config::Config;

pub mod scratch;

pub use scratch::ScratchFile;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("object s3://{bucket}/{key} does not exist")]
    NotFound { bucket: String, key: String },

    #[error("{0}")]
    Storage(String),

    #[error("failed to write scratch file: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage capability used by the pipeline. Writes the object at `bucket/key`
/// to `dest` and returns the number of bytes written.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn fetch(&self, bucket: &str, key: &str, dest: &Path) -> Result<u64, FetchError>;
}

/// S3-backed store. The client is built once at startup and shared read-only.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn fetch(&self, bucket: &str, key: &str, dest: &Path) -> Result<u64, FetchError> {
        let mut object = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    FetchError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                } else {
                    FetchError::Storage(DisplayErrorContext(&e).to_string())
                }
            })?;

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;
        while let Some(bytes) = object
            .body
            .try_next()
            .await
            .map_err(|e| FetchError::Storage(format!("failed reading object body: {e}")))?
        {
            file.write_all(&bytes).await?;
            written += bytes.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }
}

/// Constructs an S3 client for AWS, or for MinIO / localstack when `S3_ENDPOINT` is set.
pub async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()));

    if let Some((access_key_id, secret_access_key)) = &config.static_credentials {
        loader = loader.credentials_provider(Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "roaster-static",
        ));
    }
    if let Some(endpoint) = &config.s3_endpoint {
        loader = loader.endpoint_url(endpoint);
    }

    let shared = loader.load().await;
    let s3_config = aws_sdk_s3::config::Builder::from(&shared)
        .force_path_style(config.s3_endpoint.is_some())
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}
