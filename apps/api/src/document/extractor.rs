//! PDF text extraction.
//!
//! Parsing is CPU-bound and `pdf-extract` can panic on malformed input, so the work runs
//! on the blocking pool and a panic is reported as an unreadable document.

use std::path::Path;

use anyhow::anyhow;
use async_trait::async_trait;

use crate::errors::RoastError;

/// Extracted text of a single page. `page_index` is 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page_index: usize,
    pub text: String,
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, path: &Path) -> Result<Vec<PageText>, RoastError>;
}

pub struct PdfTextExtractor;

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, path: &Path) -> Result<Vec<PageText>, RoastError> {
        let path = path.to_path_buf();
        let pages = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_by_pages(&path).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| {
            if e.is_panic() {
                RoastError::unreadable("PDF parser panicked")
            } else {
                RoastError::Unhandled(anyhow!("PDF extraction task failed: {e}"))
            }
        })?
        .map_err(RoastError::unreadable)?;

        Ok(pages
            .into_iter()
            .enumerate()
            .map(|(page_index, text)| PageText { page_index, text })
            .collect())
    }
}

/// Rejects documents with no pages, or whose pages carry no text at all (e.g. scanned images).
pub fn ensure_readable(pages: Vec<PageText>) -> Result<Vec<PageText>, RoastError> {
    if pages.is_empty() {
        return Err(RoastError::unreadable("document has zero pages"));
    }
    if pages.iter().all(|p| p.text.trim().is_empty()) {
        return Err(RoastError::unreadable(format!(
            "all {} pages are blank",
            pages.len()
        )));
    }
    Ok(pages)
}

/// Concatenates page text with a blank line between pages.
pub fn full_text(pages: &[PageText]) -> String {
    pages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
