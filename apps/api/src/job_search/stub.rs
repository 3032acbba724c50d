//! Local stand-in for the JSearch API, served on an ephemeral port.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

#[derive(Clone)]
pub struct StubProvider {
    /// Jobs per page, page 1 first. Pages past the end are empty.
    pages: Arc<Vec<Vec<Value>>>,
    failure: Option<StatusCode>,
    /// Query params of every request, plus the `x-rapidapi-key` header.
    requests: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl StubProvider {
    pub fn with_pages(pages: Vec<Vec<Value>>) -> Self {
        Self {
            pages: Arc::new(pages),
            failure: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(status: StatusCode) -> Self {
        Self {
            failure: Some(status),
            ..Self::with_pages(Vec::new())
        }
    }

    pub fn requests(&self) -> Vec<HashMap<String, String>> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        self.requests()
            .iter()
            .filter_map(|r| r.get("page").and_then(|p| p.parse().ok()))
            .collect()
    }

    /// Binds `127.0.0.1:0` and returns the base URL to hand to
    /// `JobSearchClient::with_base_url`.
    pub async fn serve(&self) -> String {
        let app = Router::new()
            .route("/search", get(search))
            .with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }
}

async fn search(
    State(stub): State<StubProvider>,
    headers: HeaderMap,
    Query(mut params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, (StatusCode, String)> {
    if let Some(key) = headers.get("x-rapidapi-key").and_then(|v| v.to_str().ok()) {
        params.insert("x-rapidapi-key".to_string(), key.to_string());
    }
    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    stub.requests.lock().unwrap().push(params);

    if let Some(status) = stub.failure {
        return Err((status, "quota exceeded".to_string()));
    }
    let jobs = page
        .checked_sub(1)
        .and_then(|i| stub.pages.get(i))
        .cloned()
        .unwrap_or_default();
    Ok(Json(json!({"status": "OK", "data": jobs})))
}
