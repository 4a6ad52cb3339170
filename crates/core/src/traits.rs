use crate::error::{EmbeddingError, GenerationError, IndexError};
use crate::models::{Passage, ScoredPassage};
use async_trait::async_trait;
use std::sync::Arc;

/// External embedding model.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn dimensions(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// External generative model. The returned text is always present; a
/// response without usable text is a `GenerationError`, never an empty
/// success.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// One similarity-searchable store of passage embeddings, scoped to a
/// single uploaded document.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Storage location of this index; unique per upload.
    fn location(&self) -> &str;

    async fn add_passages(
        &self,
        passages: &[Passage],
        embeddings: &[Vec<f32>],
    ) -> Result<(), IndexError>;

    /// The `top_k` nearest passages, most similar first. An index holding
    /// no passages returns an empty result.
    async fn search(
        &self,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredPassage>, IndexError>;
}

/// Creates fresh indexes. Every call yields a new storage location; a
/// prior upload's location is never reused or overwritten.
#[async_trait]
pub trait IndexProvider: Send + Sync {
    async fn create_index(&self, dimensions: usize) -> Result<Arc<dyn VectorIndex>, IndexError>;
}
