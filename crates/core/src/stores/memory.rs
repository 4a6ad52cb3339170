use crate::error::IndexError;
use crate::models::{Passage, ScoredPassage};
use crate::traits::{IndexProvider, VectorIndex};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

/// In-process index provider: no external service, vectors held in
/// memory for the lifetime of the process.
pub struct MemoryIndexProvider;

#[async_trait]
impl IndexProvider for MemoryIndexProvider {
    async fn create_index(&self, dimensions: usize) -> Result<Arc<dyn VectorIndex>, IndexError> {
        Ok(Arc::new(MemoryIndex::new(dimensions)))
    }
}

/// Cosine-similarity index over an in-memory passage list.
pub struct MemoryIndex {
    location: String,
    vector_size: usize,
    entries: RwLock<Vec<(Passage, Vec<f32>)>>,
}

impl MemoryIndex {
    pub fn new(vector_size: usize) -> Self {
        Self {
            location: format!("memory://{}", Uuid::new_v4()),
            vector_size,
            entries: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    fn location(&self) -> &str {
        &self.location
    }

    async fn add_passages(
        &self,
        passages: &[Passage],
        embeddings: &[Vec<f32>],
    ) -> Result<(), IndexError> {
        if passages.len() != embeddings.len() {
            return Err(IndexError::Request(format!(
                "embedding count {} doesn't match passage count {}",
                embeddings.len(),
                passages.len()
            )));
        }
        for embedding in embeddings {
            if embedding.len() != self.vector_size {
                return Err(IndexError::Request(format!(
                    "embedding dimension {} != {}",
                    embedding.len(),
                    self.vector_size
                )));
            }
        }

        let mut entries = self.entries.write();
        entries.extend(
            passages
                .iter()
                .cloned()
                .zip(embeddings.iter().cloned()),
        );
        Ok(())
    }

    async fn search(
        &self,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredPassage>, IndexError> {
        if query_vector.len() != self.vector_size {
            return Err(IndexError::Request(format!(
                "query vector dim {} is not {}",
                query_vector.len(),
                self.vector_size
            )));
        }

        let entries = self.entries.read();
        let mut scored: Vec<ScoredPassage> = entries
            .iter()
            .map(|(passage, embedding)| ScoredPassage {
                passage: passage.clone(),
                score: cosine_similarity(query_vector, embedding),
            })
            .collect();

        scored.sort_by(|left, right| right.score.total_cmp(&left.score));
        scored.truncate(top_k);
        Ok(scored)
    }
}

fn cosine_similarity(left: &[f32], right: &[f32]) -> f64 {
    let mut dot = 0f64;
    let mut left_norm = 0f64;
    let mut right_norm = 0f64;
    for (a, b) in left.iter().zip(right.iter()) {
        dot += f64::from(*a) * f64::from(*b);
        left_norm += f64::from(*a) * f64::from(*a);
        right_norm += f64::from(*b) * f64::from(*b);
    }
    let magnitude = left_norm.sqrt() * right_norm.sqrt();
    if magnitude == 0.0 {
        return 0.0;
    }
    dot / magnitude
}
