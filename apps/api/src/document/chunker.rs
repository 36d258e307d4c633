//! Page chunking.
//!
//! Text is split at the coarsest boundary that fits (paragraph, line, word, then single
//! characters) into chunks of at most `chunk_size` characters, with up to `chunk_overlap`
//! characters repeated between neighbours. Chunks are trimmed and never empty.

use anyhow::{ensure, Result};
use serde::Serialize;
use text_splitter::{Characters, ChunkConfig, TextSplitter};

use crate::document::extractor::PageText;

pub const DEFAULT_CHUNK_SIZE: usize = 2000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

/// A retrievable span of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub text: String,
    pub page_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkerConfig {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl ChunkerConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        ensure!(chunk_size > 0, "chunk size must be positive");
        ensure!(
            chunk_overlap < chunk_size,
            "chunk overlap ({chunk_overlap}) must be smaller than chunk size ({chunk_size})"
        );
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// Recursive character splitter backed by `text-splitter`.
#[derive(Debug)]
pub struct RecursiveSplitter {
    splitter: TextSplitter<Characters>,
}

impl RecursiveSplitter {
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        let chunk_config =
            ChunkConfig::new(config.chunk_size).with_overlap(config.chunk_overlap)?;
        Ok(Self {
            splitter: TextSplitter::new(chunk_config),
        })
    }

    /// Splits every page, tagging each chunk with its source page. Page order is preserved.
    pub fn split_pages(&self, pages: &[PageText]) -> Vec<Chunk> {
        pages
            .iter()
            .flat_map(|page| {
                self.splitter.chunks(&page.text).map(move |text| Chunk {
                    text: text.to_string(),
                    page_index: page.page_index,
                })
            })
            .collect()
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.splitter.chunks(text).map(str::to_string).collect()
    }
}
