//! Mock embedder implementation for testing.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::{EmbedError, Embedder};

#[derive(Clone)]
enum Mode {
    /// Cycles through fixed vectors.
    Sequence(Arc<Vec<Vec<f32>>>),
    /// Bag-of-words vector: each lowercase word bumps one hashed bucket.
    Hashing { dims: usize },
}

/// Mock embedder with call counting and optional failure injection.
///
/// ```ignore
/// // Similar texts land near each other
/// let embedder = MockEmbedder::hashing(64);
///
/// // Fail on the third call
/// let embedder = MockEmbedder::hashing(64).failing_from(2);
/// ```
#[derive(Clone)]
pub struct MockEmbedder {
    mode: Mode,
    call_count: Arc<AtomicUsize>,
    fail_from: Option<usize>,
}

impl MockEmbedder {
    /// Returns vectors in sequence, wrapping around.
    pub fn with_sequence(vectors: Vec<Vec<f32>>) -> Self {
        Self {
            mode: Mode::Sequence(Arc::new(vectors)),
            call_count: Arc::new(AtomicUsize::new(0)),
            fail_from: None,
        }
    }

    pub fn hashing(dims: usize) -> Self {
        Self {
            mode: Mode::Hashing { dims },
            call_count: Arc::new(AtomicUsize::new(0)),
            fail_from: None,
        }
    }

    /// Every call whose zero-based index is `>= n` fails.
    pub fn failing_from(mut self, n: usize) -> Self {
        self.fail_from = Some(n);
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

fn hashed_bag_of_words(text: &str, dims: usize) -> Vec<f32> {
    let mut vector = vec![0.0f32; dims];
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let mut hasher = DefaultHasher::new();
        word.to_lowercase().hash(&mut hasher);
        let bucket = (hasher.finish() % dims as u64) as usize;
        vector[bucket] += 1.0;
    }
    vector
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_from.is_some_and(|n| idx >= n) {
            return Err(EmbedError::Api {
                status: 500,
                message: "simulated embedding failure".to_string(),
            });
        }
        Ok(match &self.mode {
            Mode::Sequence(vectors) => vectors[idx % vectors.len()].clone(),
            Mode::Hashing { dims } => hashed_bag_of_words(text, *dims),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_returns_sequence() {
        let embedder = MockEmbedder::with_sequence(vec![vec![1.0], vec![2.0]]);

        assert_eq!(embedder.embed("a").await.unwrap(), vec![1.0]);
        assert_eq!(embedder.embed("b").await.unwrap(), vec![2.0]);
        // Wraps around
        assert_eq!(embedder.embed("c").await.unwrap(), vec![1.0]);
        assert_eq!(embedder.call_count(), 3);
    }

    #[tokio::test]
    async fn hashing_is_deterministic_and_case_insensitive() {
        let embedder = MockEmbedder::hashing(32);
        let a = embedder.embed("Rust Engineer").await.unwrap();
        let b = embedder.embed("rust engineer").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.iter().sum::<f32>(), 2.0);
    }

    #[tokio::test]
    async fn failing_from_fails_later_calls() {
        let embedder = MockEmbedder::hashing(8).failing_from(1);
        assert!(embedder.embed("first").await.is_ok());
        assert!(embedder.embed("second").await.is_err());
    }
}
