// Document handling: PDF text extraction and recursive chunking.
// Both produce plain data consumed by the retrieval layer; neither touches the network.

pub mod chunker;
pub mod extractor;

pub use chunker::{Chunk, RecursiveSplitter};
pub use extractor::{ensure_readable, full_text, PdfTextExtractor, TextExtractor};
