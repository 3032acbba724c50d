//! JSearch client: fetches job postings for a skills query.
//!
//! A plain paginated GET with no retries; callers own the retry policy.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::job::JobRecord;

#[cfg(test)]
pub mod stub;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const MAX_PAGES: u32 = 5;

#[derive(Debug, Error)]
pub enum JobSearchError {
    #[error("invalid job search configuration: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("job search API returned {status}: {body}")]
    Api { status: u16, body: String },
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<JobRecord>,
}

#[derive(Clone)]
pub struct JobSearchClient {
    client: Client,
    base_url: String,
    host: String,
    api_key: String,
}

impl JobSearchClient {
    pub fn new(api_key: &str, host: &str) -> Result<Self, JobSearchError> {
        Self::with_base_url(api_key, host, &format!("https://{host}"))
    }

    /// Same as `new` but against an explicit base URL.
    pub fn with_base_url(api_key: &str, host: &str, base_url: &str) -> Result<Self, JobSearchError> {
        if api_key.trim().is_empty() {
            return Err(JobSearchError::Config("missing RapidAPI key".to_string()));
        }
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            host: host.to_string(),
            api_key: api_key.trim().to_string(),
        })
    }

    /// One page of results. A response without a `data` array reads as empty.
    pub async fn search_page(
        &self,
        query: &str,
        location: &str,
        page: u32,
    ) -> Result<Vec<JobRecord>, JobSearchError> {
        let params = search_params(query, location, page);
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.host)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JobSearchError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse = response.json().await?;
        debug!("Page {} returned {} jobs", page, parsed.data.len());
        Ok(parsed.data)
    }

    /// Pages 1..=num_pages (clamped to 1..=MAX_PAGES), stopping at the first
    /// empty page.
    pub async fn fetch_jobs(
        &self,
        query: &str,
        location: &str,
        num_pages: u32,
    ) -> Result<Vec<JobRecord>, JobSearchError> {
        let num_pages = num_pages.clamp(1, MAX_PAGES);
        let mut all_jobs = Vec::new();
        for page in 1..=num_pages {
            let jobs = self.search_page(query, location, page).await?;
            if jobs.is_empty() {
                break;
            }
            all_jobs.extend(jobs);
        }
        info!(
            "Fetched {} jobs for '{}' in '{}' ({} pages requested)",
            all_jobs.len(),
            query,
            location,
            num_pages
        );
        Ok(all_jobs)
    }
}

fn search_params(query: &str, location: &str, page: u32) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("query", query.trim().to_string()),
        ("page", page.to_string()),
        ("num_pages", "1".to_string()),
    ];
    if !location.trim().is_empty() {
        params.push(("location", location.trim().to_string()));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::stub::StubProvider;
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    fn one_job_pages(n: usize) -> Vec<Vec<serde_json::Value>> {
        (1..=n)
            .map(|i| vec![json!({"job_title": format!("Job {i}"), "employer_name": "Acme"})])
            .collect()
    }

    async fn client_for(stub: &StubProvider) -> JobSearchClient {
        let base_url = stub.serve().await;
        JobSearchClient::with_base_url("stub-key", "jsearch.p.rapidapi.com", &base_url).unwrap()
    }

    #[test]
    fn test_params_include_location_when_given() {
        let params = search_params("rust developer", " Austin ", 2);
        assert_eq!(
            params,
            vec![
                ("query", "rust developer".to_string()),
                ("page", "2".to_string()),
                ("num_pages", "1".to_string()),
                ("location", "Austin".to_string()),
            ]
        );
    }

    #[test]
    fn test_params_skip_blank_location() {
        let params = search_params("rust", "  ", 1);
        assert!(params.iter().all(|(k, _)| *k != "location"));
    }

    #[test]
    fn test_missing_data_reads_as_empty() {
        let parsed: SearchResponse =
            serde_json::from_str(r#"{"status": "OK", "request_id": "x"}"#).unwrap();
        assert!(parsed.data.is_empty());
    }

    #[test]
    fn test_data_parses_into_job_records() {
        let parsed: SearchResponse = serde_json::from_str(
            r#"{"data": [{"job_title": "SRE", "employer_name": "Initech", "job_apply_link": "https://x"}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.data.len(), 1);
        assert_eq!(parsed.data[0].job_title.as_deref(), Some("SRE"));
        assert_eq!(
            parsed.data[0].extra.get("job_apply_link"),
            Some(&serde_json::json!("https://x"))
        );
    }

    #[test]
    fn test_blank_key_is_rejected() {
        assert!(matches!(
            JobSearchClient::new(" ", "jsearch.p.rapidapi.com"),
            Err(JobSearchError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_stops_at_first_empty_page() {
        let stub = StubProvider::with_pages(one_job_pages(2));
        let client = client_for(&stub).await;

        let jobs = client.fetch_jobs("rust", "", 4).await.unwrap();

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[1].job_title.as_deref(), Some("Job 2"));
        assert_eq!(stub.requested_pages(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fetch_clamps_page_count() {
        let stub = StubProvider::with_pages(one_job_pages(8));
        let client = client_for(&stub).await;

        let jobs = client.fetch_jobs("rust", "", 99).await.unwrap();
        assert_eq!(jobs.len(), MAX_PAGES as usize);
        assert_eq!(stub.requested_pages(), vec![1, 2, 3, 4, 5]);

        let jobs = client.fetch_jobs("rust", "", 0).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(stub.requested_pages(), vec![1, 2, 3, 4, 5, 1]);
    }

    #[tokio::test]
    async fn test_search_page_sends_credentials_and_params() {
        let stub = StubProvider::with_pages(one_job_pages(3));
        let client = client_for(&stub).await;

        let jobs = client.search_page("rust developer", "Austin", 3).await.unwrap();

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].job_title.as_deref(), Some("Job 3"));
        let request = &stub.requests()[0];
        assert_eq!(request["x-rapidapi-key"], "stub-key");
        assert_eq!(request["query"], "rust developer");
        assert_eq!(request["location"], "Austin");
        assert_eq!(request["page"], "3");
        assert_eq!(request["num_pages"], "1");
    }

    #[tokio::test]
    async fn test_error_status_becomes_api_error() {
        let stub = StubProvider::failing(StatusCode::INTERNAL_SERVER_ERROR);
        let client = client_for(&stub).await;

        let result = client.fetch_jobs("rust", "Austin", 3).await;

        match result {
            Err(JobSearchError::Api { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "quota exceeded");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        assert_eq!(stub.requested_pages(), vec![1]);
    }

    #[test]
    fn test_base_url_defaults_to_host() {
        let client = JobSearchClient::new("key", "jsearch.p.rapidapi.com").unwrap();
        assert_eq!(client.base_url, "https://jsearch.p.rapidapi.com");
    }
}
