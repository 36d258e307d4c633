//! Roast pipeline — the whole request, start to finish.
//!
//! Flow: parse → fetch → extract → chunk → index → retrieve → generate → format.
//!
//! Strictly sequential. The first failing stage short-circuits to an error envelope;
//! nothing is retried. The only resource needing cleanup is the scratch PDF, which
//! [`ScratchFile`] removes on every exit path.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use tracing::info;

use crate::config::PipelineSettings;
use crate::document::{ensure_readable, full_text, RecursiveSplitter, TextExtractor};
use crate::errors::RoastError;
use crate::llm_client::ChatCompleter;
use crate::retrieval::{format_context, retrieve_context, Embedder, VectorIndex};
use crate::roast::generator::generate_roast;
use crate::roast::request::{parse_request, RoastRequest};
use crate::roast::response::{ResponseEnvelope, RoastMetadata};
use crate::storage::{ObjectStore, ScratchFile};

/// The external collaborators a pipeline run needs. Built once at startup,
/// never mutated, shared across requests.
#[derive(Clone)]
pub struct Capabilities {
    pub store: Arc<dyn ObjectStore>,
    pub extractor: Arc<dyn TextExtractor>,
    pub embedder: Arc<dyn Embedder>,
    pub completer: Arc<dyn ChatCompleter>,
}

#[derive(Debug, Clone)]
pub struct RoastOutcome {
    pub roast: String,
    pub metadata: RoastMetadata,
}

/// Entry point: raw request body in, response envelope out. Never fails.
pub async fn handle_request(
    capabilities: &Capabilities,
    settings: &PipelineSettings,
    body: &str,
) -> ResponseEnvelope {
    let started = Instant::now();

    let request = match parse_request(body) {
        Ok(request) => request,
        Err(err) => {
            err.log(None);
            return ResponseEnvelope::from_error(&err);
        }
    };

    info!("Processing request {}", request.request_id);
    info!(
        "S3 location: s3://{}/{}",
        request.s3_bucket, request.s3_key
    );

    match run_pipeline(capabilities, settings, &request, started).await {
        Ok(outcome) => {
            info!(
                "Request {} completed in {}ms",
                request.request_id, outcome.metadata.processing_time_ms
            );
            ResponseEnvelope::success(&request.request_id, &outcome.roast, &outcome.metadata)
        }
        Err(err) => {
            err.log(Some(&request.request_id));
            ResponseEnvelope::from_error(&err)
        }
    }
}

/// Runs every stage after parsing.
async fn run_pipeline(
    capabilities: &Capabilities,
    settings: &PipelineSettings,
    request: &RoastRequest,
    started: Instant,
) -> Result<RoastOutcome, RoastError> {
    let request_id = request.request_id.as_str();

    // Step 1: download into scratch space
    let scratch = ScratchFile::create(&settings.scratch_dir, request_id)
        .context("failed to create scratch file")?;
    info!("Downloading PDF to {}", scratch.path().display());
    let size = capabilities
        .store
        .fetch(&request.s3_bucket, &request.s3_key, scratch.path())
        .await?;
    info!("Downloaded {size} bytes");

    // Step 2: extract page text
    let pages = ensure_readable(capabilities.extractor.extract(scratch.path()).await?)?;
    info!("Loaded {} pages from PDF", pages.len());
    let resume_text = full_text(&pages);

    // Step 3: chunk
    let chunks = RecursiveSplitter::new(settings.chunker)
        .context("invalid chunker settings")?
        .split_pages(&pages);
    let chunks_processed = chunks.len();
    info!("Created {chunks_processed} chunks from {} pages", pages.len());

    // Step 4: embed + index
    let index = VectorIndex::build(chunks, capabilities.embedder.as_ref(), request_id).await?;

    // Step 5: retrieve
    let results = retrieve_context(
        &index,
        capabilities.embedder.as_ref(),
        &settings.queries,
        settings.results_per_query,
        settings.max_context_sections,
    )
    .await?;
    info!("Retrieved {} context sections", results.len());
    let context = format_context(&results);

    // Step 6: generate
    let roast = generate_roast(
        capabilities.completer.as_ref(),
        &context,
        &resume_text,
        settings.resume_prompt_chars,
        &settings.completion,
    )
    .await?;

    let processing_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    scratch.release();
    info!("Cleaned up temporary files");

    Ok(RoastOutcome {
        roast,
        metadata: RoastMetadata {
            chunks_processed,
            pages_processed: pages.len(),
            processing_time_ms,
            model_used: capabilities.completer.model_id().to_string(),
            embedding_model: capabilities.embedder.model_id().to_string(),
        },
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::extractor::PageText;
    use crate::roast::prompts::ROAST_SECTIONS;
    use crate::testing::{
        capabilities, two_page_resume, BagOfWordsEmbedder, FakeStore, ScriptedCompleter,
        UnreachableEmbedder, PAGE_BREAK,
    };
    use axum::http::StatusCode;
    use tempfile::TempDir;

    const VALID_BODY: &str =
        r#"{"s3_bucket":"bucket1","s3_key":"resumes/a.pdf","request_id":"req-123"}"#;

    fn settings(scratch: &TempDir) -> PipelineSettings {
        PipelineSettings {
            scratch_dir: scratch.path().to_path_buf(),
            ..PipelineSettings::default()
        }
    }

    fn store_with(content: &str) -> FakeStore {
        FakeStore::default().with_object("bucket1", "resumes/a.pdf", content)
    }

    fn default_capabilities(store: FakeStore) -> Capabilities {
        capabilities(
            store,
            Arc::new(BagOfWordsEmbedder::default()),
            Arc::new(ScriptedCompleter::default()),
        )
    }

    fn scratch_is_empty(scratch: &TempDir) -> bool {
        std::fs::read_dir(scratch.path()).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn test_two_page_resume_end_to_end() {
        let scratch = tempfile::tempdir().unwrap();
        let caps = default_capabilities(store_with(&two_page_resume()));

        let envelope = handle_request(&caps, &settings(&scratch), VALID_BODY).await;

        assert_eq!(envelope.status, StatusCode::OK, "{}", envelope.body);
        assert_eq!(envelope.body["request_id"], "req-123");
        let roast = envelope.body["roast"].as_str().unwrap();
        for section in ROAST_SECTIONS {
            assert!(roast.contains(section), "roast missing {section}");
        }
        let metadata = &envelope.body["metadata"];
        assert_eq!(metadata["pages_processed"], 2);
        assert_eq!(metadata["chunks_processed"], 2);
        assert_eq!(metadata["model_used"], "scripted");
        assert_eq!(metadata["embedding_model"], "bag-of-words");
        assert!(metadata["processing_time_ms"].is_u64());
        assert!(scratch_is_empty(&scratch));
    }

    #[tokio::test]
    async fn test_chunk_count_matches_splitter() {
        let scratch = tempfile::tempdir().unwrap();
        let long_page = "Shipped a feature that moved a metric. ".repeat(300);
        let content = format!("{long_page}{PAGE_BREAK}Skills: Rust");
        let caps = default_capabilities(store_with(&content));
        let settings = settings(&scratch);

        let envelope = handle_request(&caps, &settings, VALID_BODY).await;
        assert_eq!(envelope.status, StatusCode::OK);

        let pages = vec![
            PageText {
                page_index: 0,
                text: long_page.clone(),
            },
            PageText {
                page_index: 1,
                text: "Skills: Rust".to_string(),
            },
        ];
        let expected = RecursiveSplitter::new(settings.chunker)
            .unwrap()
            .split_pages(&pages)
            .len();
        assert!(expected > 2);
        assert_eq!(envelope.body["metadata"]["chunks_processed"], expected);
        assert_eq!(envelope.body["metadata"]["pages_processed"], 2);
    }

    #[tokio::test]
    async fn test_context_capped_at_five_sections() {
        let scratch = tempfile::tempdir().unwrap();
        let completer = Arc::new(ScriptedCompleter::default());
        let content = (0..8)
            .map(|i| format!("Page {i} experience skills formatting"))
            .collect::<Vec<_>>()
            .join(&PAGE_BREAK.to_string());
        let caps = capabilities(
            store_with(&content),
            Arc::new(BagOfWordsEmbedder::default()),
            completer.clone(),
        );

        let envelope = handle_request(&caps, &settings(&scratch), VALID_BODY).await;
        assert_eq!(envelope.status, StatusCode::OK);

        let (_, user) = completer.last_prompts().unwrap();
        assert!(user.contains("Section 5:"));
        assert!(!user.contains("Section 6:"));
    }

    #[tokio::test]
    async fn test_missing_fields_is_400() {
        let scratch = tempfile::tempdir().unwrap();
        let caps = default_capabilities(store_with(&two_page_resume()));

        let envelope = handle_request(
            &caps,
            &settings(&scratch),
            r#"{"s3_bucket":"bucket1","request_id":"req-123"}"#,
        )
        .await;
        assert_eq!(envelope.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            envelope.body["error"],
            "Missing required fields: s3_bucket, s3_key, request_id"
        );
    }

    #[tokio::test]
    async fn test_invalid_json_is_400() {
        let scratch = tempfile::tempdir().unwrap();
        let caps = default_capabilities(FakeStore::default());

        let envelope = handle_request(&caps, &settings(&scratch), "not json").await;
        assert_eq!(envelope.status, StatusCode::BAD_REQUEST);
        assert_eq!(envelope.body["error"], "Invalid JSON in request body");
    }

    #[tokio::test]
    async fn test_missing_object_is_500() {
        let scratch = tempfile::tempdir().unwrap();
        let caps = default_capabilities(FakeStore::default());

        let envelope = handle_request(&caps, &settings(&scratch), VALID_BODY).await;
        assert_eq!(envelope.status, StatusCode::INTERNAL_SERVER_ERROR);
        let error = envelope.body["error"].as_str().unwrap();
        assert!(error.starts_with("Failed to download PDF from S3"), "{error}");
        assert!(envelope.body.get("roast").is_none());
        assert!(scratch_is_empty(&scratch));
    }

    #[tokio::test]
    async fn test_zero_page_document_is_400() {
        let scratch = tempfile::tempdir().unwrap();
        let caps = default_capabilities(store_with(""));

        let envelope = handle_request(&caps, &settings(&scratch), VALID_BODY).await;
        assert_eq!(envelope.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            envelope.body["error"],
            "PDF appears to be empty or unreadable"
        );
        assert!(scratch_is_empty(&scratch));
    }

    #[tokio::test]
    async fn test_unparseable_document_is_400() {
        let scratch = tempfile::tempdir().unwrap();
        let caps = default_capabilities(store_with("%BROKEN pdf"));

        let envelope = handle_request(&caps, &settings(&scratch), VALID_BODY).await;
        assert_eq!(envelope.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_embedding_failure_is_500() {
        let scratch = tempfile::tempdir().unwrap();
        let caps = capabilities(
            store_with(&two_page_resume()),
            Arc::new(UnreachableEmbedder),
            Arc::new(ScriptedCompleter::default()),
        );

        let envelope = handle_request(&caps, &settings(&scratch), VALID_BODY).await;
        assert_eq!(envelope.status, StatusCode::INTERNAL_SERVER_ERROR);
        let error = envelope.body["error"].as_str().unwrap();
        assert!(error.starts_with("Failed to embed resume text"), "{error}");
        assert!(scratch_is_empty(&scratch));
    }

    #[tokio::test]
    async fn test_empty_generation_is_500() {
        let scratch = tempfile::tempdir().unwrap();
        let caps = capabilities(
            store_with(&two_page_resume()),
            Arc::new(BagOfWordsEmbedder::default()),
            Arc::new(ScriptedCompleter::replying("")),
        );

        let envelope = handle_request(&caps, &settings(&scratch), VALID_BODY).await;
        assert_eq!(envelope.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            envelope.body["error"],
            "Failed to generate roast: LLM returned empty content"
        );
    }

    #[tokio::test]
    async fn test_missing_scratch_dir_is_500() {
        let scratch = tempfile::tempdir().unwrap();
        let settings = PipelineSettings {
            scratch_dir: scratch.path().join("does-not-exist"),
            ..PipelineSettings::default()
        };
        let caps = default_capabilities(store_with(&two_page_resume()));

        let envelope = handle_request(&caps, &settings, VALID_BODY).await;
        assert_eq!(envelope.status, StatusCode::INTERNAL_SERVER_ERROR);
        let error = envelope.body["error"].as_str().unwrap();
        assert!(error.starts_with("Internal server error"), "{error}");
    }

    #[tokio::test]
    async fn test_repeat_requests_are_independent() {
        let scratch = tempfile::tempdir().unwrap();
        let caps = default_capabilities(store_with(&two_page_resume()));
        let settings = settings(&scratch);

        let first = handle_request(&caps, &settings, VALID_BODY).await;
        let second = handle_request(&caps, &settings, VALID_BODY).await;
        assert_eq!(
            first.body["metadata"]["chunks_processed"],
            second.body["metadata"]["chunks_processed"]
        );
        assert_eq!(first.body["roast"], second.body["roast"]);
    }
}
