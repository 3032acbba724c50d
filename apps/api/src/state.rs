use std::sync::Arc;

use crate::config::Config;
use crate::job_search::JobSearchClient;
use crate::rag::agent::JobRagAgent;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// One agent per process; its index serializes writes internally.
    pub agent: Arc<JobRagAgent>,
    pub job_search: JobSearchClient,
    pub config: Config,
}
