//! Axum route handlers for job search and matching.

use std::future::Future;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::job::JobRecord;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FindJobsRequest {
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub location: String,
    pub page: Option<u32>,
    pub pages: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct FindJobsResponse {
    pub jobs: Vec<JobRecord>,
}

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub jobs: Vec<JobRecord>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub ingested: usize,
    pub indexed_jobs: usize,
}

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub recommendations: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchAndMatchRequest {
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub location: String,
    pub pages: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SearchAndMatchResponse {
    pub jobs: Vec<JobRecord>,
    pub recommendations: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /find-jobs/
///
/// Raw provider results, no matching. `pages > 1` walks pages from 1;
/// otherwise the single `page` is fetched.
pub async fn handle_find_jobs(
    State(state): State<AppState>,
    Json(request): Json<FindJobsRequest>,
) -> Result<Json<FindJobsResponse>, AppError> {
    require_skills(&request.skills)?;

    let jobs = match request.pages {
        Some(pages) if pages > 1 => {
            state
                .job_search
                .fetch_jobs(&request.skills, &request.location, pages)
                .await?
        }
        _ => {
            state
                .job_search
                .search_page(&request.skills, &request.location, request.page.unwrap_or(1).max(1))
                .await?
        }
    };

    Ok(Json(FindJobsResponse { jobs }))
}

/// POST /api/v1/jobs/ingest
pub async fn handle_ingest(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, AppError> {
    let ingested = state.agent.ingest_jobs(request.jobs).await?;
    let indexed_jobs = state.agent.document_count().await;
    Ok(Json(IngestResponse {
        ingested,
        indexed_jobs,
    }))
}

/// POST /api/v1/jobs/match
///
/// A model answer saying nothing fits is still a 200; only pipeline failures
/// are errors.
pub async fn handle_match(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    require_skills(&request.skills)?;

    let recommendations = with_deadline(
        state.config.request_timeout_secs,
        state.agent.match_jobs(&request.skills, &request.location),
    )
    .await?;

    Ok(Json(MatchResponse { recommendations }))
}

/// POST /api/v1/jobs/search-and-match
///
/// Fetch → ingest → match. With zero fetched jobs the match still runs
/// against whatever is already indexed.
pub async fn handle_search_and_match(
    State(state): State<AppState>,
    Json(request): Json<SearchAndMatchRequest>,
) -> Result<Json<SearchAndMatchResponse>, AppError> {
    require_skills(&request.skills)?;

    let jobs = state
        .job_search
        .fetch_jobs(&request.skills, &request.location, request.pages.unwrap_or(1))
        .await?;

    if !jobs.is_empty() {
        state.agent.ingest_jobs(jobs.clone()).await?;
    }
    info!("Search returned {} jobs, matching against index", jobs.len());

    let recommendations = with_deadline(
        state.config.request_timeout_secs,
        state.agent.match_jobs(&request.skills, &request.location),
    )
    .await?;

    Ok(Json(SearchAndMatchResponse {
        jobs,
        recommendations,
    }))
}

/// DELETE /api/v1/jobs
pub async fn handle_clear(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.agent.clear_jobs().await?;
    Ok(StatusCode::NO_CONTENT)
}

fn require_skills(skills: &str) -> Result<(), AppError> {
    if skills.trim().is_empty() {
        return Err(AppError::Validation(
            "Please enter at least one skill".to_string(),
        ));
    }
    Ok(())
}

async fn with_deadline<F, T, E>(secs: u64, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, E>>,
    AppError: From<E>,
{
    match tokio::time::timeout(Duration::from_secs(secs), fut).await {
        Ok(result) => result.map_err(AppError::from),
        Err(_) => Err(AppError::Timeout(secs)),
    }
}
