use std::sync::Arc;

use tracing::debug;

use crate::rag::document::IndexedDocument;
use crate::rag::error::RagError;
use crate::rag::index::EmbeddingIndex;

/// Fixed-breadth top-k lookup over the embedding index. Breadth is wider
/// than the final shortlist; the language model re-ranks what comes back.
pub struct Retriever {
    index: Arc<EmbeddingIndex>,
    k: usize,
}

impl Retriever {
    pub fn new(index: Arc<EmbeddingIndex>, k: usize) -> Result<Self, RagError> {
        if k == 0 {
            return Err(RagError::Configuration(
                "retrieval breadth must be greater than zero".to_string(),
            ));
        }
        Ok(Self { index, k })
    }

    /// Nearest documents for `query_text`, most similar first. An index
    /// failure is an error, never an empty result.
    pub async fn retrieve_for_match(
        &self,
        query_text: &str,
    ) -> Result<Vec<IndexedDocument>, RagError> {
        let documents = self
            .index
            .retrieve(query_text, self.k)
            .await
            .map_err(RagError::Retrieval)?;
        debug!("Retrieved {} of at most {} documents", documents.len(), self.k);
        Ok(documents)
    }
}
