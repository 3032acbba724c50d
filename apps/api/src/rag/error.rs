use thiserror::Error;

use crate::llm_client::LlmError;
use crate::rag::index::IndexError;

/// Failure kinds of the matching pipeline.
///
/// Each kind calls for a different remedy, so callers must not collapse them:
/// `Configuration` means fix the deployment, `Generation` is usually worth a
/// retry, `Retrieval` points at the local index.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Embedding or storage failed while ingesting. Nothing from the batch is
    /// committed when embedding fails.
    #[error("Ingestion failed: {0}")]
    Ingestion(#[source] IndexError),

    #[error("Retrieval failed: {0}")]
    Retrieval(#[source] IndexError),

    #[error("Generation failed: {0}")]
    Generation(#[from] LlmError),
}
