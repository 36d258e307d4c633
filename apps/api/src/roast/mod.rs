// Roast API: request parsing, the end-to-end pipeline, prompt construction,
// and the uniform response envelope.

pub mod generator;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod request;
pub mod response;
