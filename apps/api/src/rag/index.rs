//! Embedding Index: a persistent, file-backed vector collection.
//!
//! One collection lives in `<dir>/<name>.json`. Every mutation rewrites the
//! file atomically (temp file in the same directory, then rename), so a crash
//! never leaves a half-written collection behind.
//!
//! Writes embed first and commit second: the write lock is only taken once
//! every vector is in hand, which keeps `add` all-or-error and keeps slow
//! provider calls from blocking readers.

use std::collections::HashSet;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::job::JobRecord;
use crate::rag::document::IndexedDocument;
use crate::rag::embedder::{EmbedError, Embedder};

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbedError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("collection file {path} is corrupted: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize collection: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("background write task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("vector has {got} dimensions, collection expects {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("document {0} has empty text")]
    EmptyText(Uuid),

    #[error("document id {0} is already stored")]
    DuplicateId(Uuid),

    #[error("retrieval breadth k must be greater than zero")]
    InvalidK,
}

/// How nearness between two vectors is measured. Smaller distance is nearer
/// for both metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// `1 - cosine_similarity`
    #[default]
    Cosine,
    /// Euclidean distance.
    L2,
}

impl DistanceMetric {
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            DistanceMetric::Cosine => 1.0 - cosine_similarity(a, b),
            DistanceMetric::L2 => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f32>()
                .sqrt(),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMetric::Cosine => f.write_str("cosine"),
            DistanceMetric::L2 => f.write_str("l2"),
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cosine" => Ok(DistanceMetric::Cosine),
            "l2" | "euclidean" => Ok(DistanceMetric::L2),
            other => Err(format!("unknown distance metric '{other}' (expected cosine or l2)")),
        }
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Where a collection lives and how it is searched.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub dir: PathBuf,
    pub collection: String,
    pub metric: DistanceMetric,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    id: Uuid,
    text: String,
    metadata: JobRecord,
    embedding: Vec<f32>,
    indexed_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Collection {
    name: String,
    metric: DistanceMetric,
    /// Fixed by the first batch written; `None` while empty.
    dimensions: Option<usize>,
    entries: Vec<StoredEntry>,
}

impl Collection {
    fn empty(name: &str, metric: DistanceMetric) -> Self {
        Self {
            name: name.to_string(),
            metric,
            dimensions: None,
            entries: Vec::new(),
        }
    }
}

/// Handle to one open collection. Share it behind an `Arc`; the collection
/// is guarded internally so concurrent adds cannot corrupt it.
pub struct EmbeddingIndex {
    path: PathBuf,
    /// Metric a fresh collection starts with; a stored one may override it.
    configured_metric: DistanceMetric,
    embedder: Arc<dyn Embedder>,
    collection: RwLock<Collection>,
}

impl EmbeddingIndex {
    /// Opens the collection described by `config`, creating the directory and
    /// an empty collection when nothing is on disk yet.
    pub fn open(config: &IndexConfig, embedder: Arc<dyn Embedder>) -> Result<Self, IndexError> {
        std::fs::create_dir_all(&config.dir).map_err(|source| IndexError::Io {
            path: config.dir.clone(),
            source,
        })?;
        let path = config.dir.join(format!("{}.json", config.collection));

        let collection = match std::fs::read(&path) {
            Ok(bytes) => {
                let collection: Collection =
                    serde_json::from_slice(&bytes).map_err(|source| IndexError::Corrupt {
                        path: path.clone(),
                        source,
                    })?;
                if collection.metric != config.metric {
                    warn!(
                        "Collection {} was written with metric {}, ignoring configured {}",
                        path.display(),
                        collection.metric,
                        config.metric
                    );
                }
                info!(
                    "Opened collection {} with {} documents",
                    path.display(),
                    collection.entries.len()
                );
                collection
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("Creating empty collection at {}", path.display());
                Collection::empty(&config.collection, config.metric)
            }
            Err(source) => return Err(IndexError::Io { path, source }),
        };

        Ok(Self {
            path,
            configured_metric: config.metric,
            embedder,
            collection: RwLock::new(collection),
        })
    }

    /// Metric used for every retrieval on this collection.
    pub async fn metric(&self) -> DistanceMetric {
        self.collection.read().await.metric
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn len(&self) -> usize {
        self.collection.read().await.entries.len()
    }

    /// Embeds and stores `documents`. Either all of them are committed and
    /// persisted, or an error is returned and the collection is unchanged.
    pub async fn add(&self, documents: Vec<IndexedDocument>) -> Result<usize, IndexError> {
        if documents.is_empty() {
            return Ok(0);
        }
        if let Some(doc) = documents.iter().find(|d| d.text.trim().is_empty()) {
            return Err(IndexError::EmptyText(doc.id));
        }

        let vectors = self.embed_all(&documents).await?;
        let dims = vectors[0].len();
        if let Some(bad) = vectors.iter().find(|v| v.len() != dims) {
            return Err(IndexError::DimensionMismatch {
                expected: dims,
                got: bad.len(),
            });
        }

        let mut collection = self.collection.write().await;
        if let Some(expected) = collection.dimensions {
            if expected != dims {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    got: dims,
                });
            }
        }
        let known: HashSet<Uuid> = collection.entries.iter().map(|e| e.id).collect();
        let mut seen = HashSet::with_capacity(documents.len());
        for doc in &documents {
            if known.contains(&doc.id) || !seen.insert(doc.id) {
                return Err(IndexError::DuplicateId(doc.id));
            }
        }

        let previous_len = collection.entries.len();
        let previous_dims = collection.dimensions;
        let now = Utc::now();
        collection.dimensions = Some(dims);
        collection
            .entries
            .extend(documents.into_iter().zip(vectors).map(|(doc, embedding)| StoredEntry {
                id: doc.id,
                text: doc.text,
                metadata: doc.metadata,
                embedding,
                indexed_at: now,
            }));

        if let Err(e) = self.persist(&collection).await {
            collection.entries.truncate(previous_len);
            collection.dimensions = previous_dims;
            return Err(e);
        }

        let added = collection.entries.len() - previous_len;
        debug!("Committed {} documents to {}", added, self.path.display());
        Ok(added)
    }

    /// Returns up to `k` documents nearest to `query`, nearest first.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<IndexedDocument>, IndexError> {
        if k == 0 {
            return Err(IndexError::InvalidK);
        }
        if self.len().await == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed(query).await?;

        let collection = self.collection.read().await;
        if let Some(expected) = collection.dimensions {
            if expected != query_vector.len() {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    got: query_vector.len(),
                });
            }
        }

        let mut scored: Vec<(f32, &StoredEntry)> = collection
            .entries
            .iter()
            .map(|entry| {
                let distance = collection.metric.distance(&query_vector, &entry.embedding);
                // Non-finite components give NaN; rank those last.
                let distance = if distance.is_nan() { f32::INFINITY } else { distance };
                (distance, entry)
            })
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(distance, entry)| {
                debug!(id = %entry.id, distance, "retrieved document");
                IndexedDocument {
                    id: entry.id,
                    text: entry.text.clone(),
                    metadata: entry.metadata.clone(),
                }
            })
            .collect())
    }

    /// Deletes the whole collection, on disk and in memory. Irreversible.
    /// The emptied collection goes back to the configured metric.
    pub async fn reset(&self) -> Result<(), IndexError> {
        let mut collection = self.collection.write().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(IndexError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        }
        let removed = collection.entries.len();
        collection.entries.clear();
        collection.dimensions = None;
        collection.metric = self.configured_metric;
        info!("Reset collection {} ({} documents removed)", self.path.display(), removed);
        Ok(())
    }

    async fn embed_all(&self, documents: &[IndexedDocument]) -> Result<Vec<Vec<f32>>, IndexError> {
        let batch_size = self.embedder.max_batch_size().max(1);
        let mut vectors = Vec::with_capacity(documents.len());
        for chunk in documents.chunks(batch_size) {
            let texts: Vec<&str> = chunk.iter().map(|d| d.text.as_str()).collect();
            let batch = self.embedder.embed_batch(&texts).await?;
            if batch.len() != texts.len() {
                return Err(EmbedError::CountMismatch {
                    expected: texts.len(),
                    got: batch.len(),
                }
                .into());
            }
            vectors.extend(batch);
        }
        Ok(vectors)
    }

    async fn persist(&self, collection: &Collection) -> Result<(), IndexError> {
        let bytes = serde_json::to_vec(collection)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&path, &bytes)).await?
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), IndexError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let io_err = |source: std::io::Error| IndexError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
