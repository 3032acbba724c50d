// Job matching pipeline: document building, embedding index, retrieval,
// grounded generation. All model calls go through llm_client or an Embedder.

pub mod agent;
pub mod document;
pub mod embedder;
pub mod error;
pub mod handlers;
pub mod index;
pub mod matcher;
pub mod prompts;
pub mod retriever;
