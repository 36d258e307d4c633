//! In-memory capability doubles shared by the pipeline and router tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::document::extractor::PageText;
use crate::document::TextExtractor;
use crate::errors::RoastError;
use crate::llm_client::{ChatCompleter, CompletionParams, GenerationError};
use crate::retrieval::embedder::EmbeddingError;
use crate::retrieval::Embedder;
use crate::roast::pipeline::Capabilities;
use crate::storage::{FetchError, ObjectStore};

/// Form feed separates pages in the fake "PDF" bytes.
pub const PAGE_BREAK: char = '\u{000C}';

#[derive(Default)]
pub struct FakeStore {
    objects: HashMap<(String, String), Vec<u8>>,
}

impl FakeStore {
    pub fn with_object(mut self, bucket: &str, key: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.objects
            .insert((bucket.to_string(), key.to_string()), bytes.into());
        self
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn fetch(&self, bucket: &str, key: &str, dest: &Path) -> Result<u64, FetchError> {
        let bytes = self
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .ok_or_else(|| FetchError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })?;
        tokio::fs::write(dest, bytes).await?;
        Ok(bytes.len() as u64)
    }
}

/// Reads the scratch file as UTF-8 and treats each form-feed separated part as a page.
/// An empty file has zero pages; a file starting with `%BROKEN` fails to parse.
pub struct PageBreakExtractor;

#[async_trait]
impl TextExtractor for PageBreakExtractor {
    async fn extract(&self, path: &Path) -> Result<Vec<PageText>, RoastError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RoastError::unreadable(e.to_string()))?;
        if content.starts_with("%BROKEN") {
            return Err(RoastError::unreadable("broken xref"));
        }
        if content.is_empty() {
            return Ok(vec![]);
        }
        Ok(content
            .split(PAGE_BREAK)
            .enumerate()
            .map(|(page_index, text)| PageText {
                page_index,
                text: text.to_string(),
            })
            .collect())
    }
}

const BAG_DIMENSIONS: usize = 256;

/// Deterministic hashed bag-of-words embedder.
#[derive(Default)]
pub struct BagOfWordsEmbedder {
    calls: AtomicUsize,
}

impl BagOfWordsEmbedder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for BagOfWordsEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }
        let mut vector = vec![0.0; BAG_DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            vector[fnv1a(&word.to_lowercase()) % BAG_DIMENSIONS] += 1.0;
        }
        Ok(vector)
    }

    fn model_id(&self) -> &str {
        "bag-of-words"
    }
}

fn fnv1a(word: &str) -> usize {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in word.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash as usize
}

pub struct UnreachableEmbedder;

#[async_trait]
impl Embedder for UnreachableEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::Api {
            status: 503,
            message: "service unavailable".to_string(),
        })
    }

    fn model_id(&self) -> &str {
        "unreachable"
    }
}

pub const CANNED_ROAST: &str = "**Summary (Roast)** bro is cooked fr fr.\n\n\
    **Experience Critique** it's giving intern energy.\n\n\
    **Skills Assessment** mid, no cap.\n\n\
    **Format & Style** two pages of vibes.\n\n\
    Tips: quantify impact, cut buzzwords, tighten layout.";

/// Returns a fixed reply and records the prompts it was given.
pub struct ScriptedCompleter {
    reply: String,
    last_prompts: Mutex<Option<(String, String)>>,
}

impl ScriptedCompleter {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            last_prompts: Mutex::new(None),
        }
    }

    pub fn last_prompts(&self) -> Option<(String, String)> {
        self.last_prompts.lock().unwrap().clone()
    }
}

impl Default for ScriptedCompleter {
    fn default() -> Self {
        Self::replying(CANNED_ROAST)
    }
}

#[async_trait]
impl ChatCompleter for ScriptedCompleter {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        _params: &CompletionParams,
    ) -> Result<String, GenerationError> {
        *self.last_prompts.lock().unwrap() = Some((system.to_string(), user.to_string()));
        Ok(self.reply.clone())
    }

    fn model_id(&self) -> &str {
        "scripted"
    }
}

/// Builds a two-page resume of roughly 500 words.
pub fn two_page_resume() -> String {
    let page_one = (0..25)
        .map(|i| {
            format!("Led cross-functional initiative number {i} improving delivery speed measurably.")
        })
        .collect::<Vec<_>>()
        .join("\n");
    let page_two = (0..25)
        .map(|i| format!("Skills group {i}: Rust, Python, Kubernetes, communication, leadership."))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{page_one}{PAGE_BREAK}{page_two}")
}

pub fn capabilities(
    store: FakeStore,
    embedder: Arc<dyn Embedder>,
    completer: Arc<dyn ChatCompleter>,
) -> Capabilities {
    Capabilities {
        store: Arc::new(store),
        extractor: Arc::new(PageBreakExtractor),
        embedder,
        completer,
    }
}
