//! Job RAG Agent: composition root of the matching pipeline.
//!
//! Flow: ingest_jobs → build_document → index.add
//!       match_jobs  → instruction → retriever → stuffed prompt → LLM
//!
//! The agent owns no ambient state: the index handle is opened by the caller
//! and passed in, so two agents on two directories never see each other.

use std::sync::Arc;

use tracing::info;

use crate::llm_client::LanguageModel;
use crate::models::job::JobRecord;
use crate::rag::document::build_document;
use crate::rag::error::RagError;
use crate::rag::index::EmbeddingIndex;
use crate::rag::matcher::Matcher;
use crate::rag::retriever::Retriever;

/// Retrieval breadth and shortlist size. Both are heuristics, so they are
/// configuration rather than constants.
#[derive(Debug, Clone, Copy)]
pub struct MatchSettings {
    pub retrieval_k: usize,
    pub shortlist_size: usize,
    pub max_context_chars: usize,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            retrieval_k: 10,
            shortlist_size: 5,
            max_context_chars: 24_000,
        }
    }
}

impl MatchSettings {
    fn validate(&self) -> Result<(), RagError> {
        if self.shortlist_size == 0 {
            return Err(RagError::Configuration(
                "shortlist size must be greater than zero".to_string(),
            ));
        }
        if self.retrieval_k < self.shortlist_size {
            return Err(RagError::Configuration(format!(
                "retrieval breadth ({}) must be at least the shortlist size ({})",
                self.retrieval_k, self.shortlist_size
            )));
        }
        if self.max_context_chars == 0 {
            return Err(RagError::Configuration(
                "context budget must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

pub struct JobRagAgent {
    index: Arc<EmbeddingIndex>,
    matcher: Matcher,
}

impl JobRagAgent {
    /// Builds a ready agent. Invalid settings fail here, never at first use.
    pub fn new(
        index: Arc<EmbeddingIndex>,
        llm: Arc<dyn LanguageModel>,
        settings: MatchSettings,
    ) -> Result<Self, RagError> {
        settings.validate()?;
        let retriever = Retriever::new(index.clone(), settings.retrieval_k)?;
        let matcher = Matcher::new(
            retriever,
            llm,
            settings.shortlist_size,
            settings.max_context_chars,
        );
        Ok(Self { index, matcher })
    }

    /// Embeds and stores one document per job. Re-ingesting the same postings
    /// adds them again; there is no deduplication.
    pub async fn ingest_jobs(&self, jobs: Vec<JobRecord>) -> Result<usize, RagError> {
        let documents: Vec<_> = jobs.into_iter().map(build_document).collect();
        let added = self
            .index
            .add(documents)
            .await
            .map_err(RagError::Ingestion)?;
        info!("Ingested {} jobs into {}", added, self.index.path().display());
        Ok(added)
    }

    pub async fn match_jobs(&self, skills_query: &str, location: &str) -> Result<String, RagError> {
        self.matcher.match_jobs(skills_query, location).await
    }

    /// Irreversibly empties the index. Gate behind explicit user intent.
    pub async fn clear_jobs(&self) -> Result<(), RagError> {
        self.index.reset().await.map_err(RagError::Ingestion)
    }

    pub async fn document_count(&self) -> usize {
        self.index.len().await
    }
}
