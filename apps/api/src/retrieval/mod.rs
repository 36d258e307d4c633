// Retrieval: embeddings, the per-request vector index, and multi-query context lookup.
// The index lives only as long as the request that built it.

pub mod embedder;
pub mod index;
pub mod retriever;

pub use embedder::{Embedder, OpenAiEmbedder};
pub use index::VectorIndex;
pub use retriever::{format_context, retrieve_context};
