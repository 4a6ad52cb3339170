use crate::error::QueryError;
use crate::models::ScoredPassage;
use crate::prompt::{parse_relevance_verdict, relevance_prompt};
use crate::traits::{Embedder, LanguageModel, VectorIndex};
use std::sync::Arc;
use tracing::debug;

/// Two-stage retrieval: top-k similarity search, then an LLM relevance
/// judgment per candidate. The second stage is a quality gate, not a
/// re-ranking; survivors keep their similarity order.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    judge: Arc<dyn LanguageModel>,
    top_k: usize,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, judge: Arc<dyn LanguageModel>, top_k: usize) -> Self {
        Self {
            embedder,
            judge,
            top_k,
        }
    }

    /// May return fewer than `top_k` passages, including none. A failed
    /// judge call fails the whole retrieval; there is no fallback to
    /// unfiltered candidates.
    pub async fn retrieve(
        &self,
        index: &dyn VectorIndex,
        query: &str,
    ) -> Result<Vec<ScoredPassage>, QueryError> {
        let query_vector = self.embedder.embed(query).await?;
        let candidates = index.search(&query_vector, self.top_k).await?;
        debug!(candidates = candidates.len(), "similarity stage complete");

        let mut relevant = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let prompt = relevance_prompt(query, &candidate.passage.text);
            let verdict = self.judge.complete(&prompt).await?;
            if parse_relevance_verdict(&verdict) {
                relevant.push(candidate);
            } else {
                debug!(
                    page = candidate.passage.page_number,
                    "passage judged irrelevant"
                );
            }
        }

        Ok(relevant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EmbeddingError, GenerationError, IndexError};
    use crate::models::Passage;
    use async_trait::async_trait;

    struct FakeEmbedder;

    #[async_trait]
    impl Embedder for FakeEmbedder {
        fn dimensions(&self) -> usize {
            2
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(vec![1.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    /// Judges any passage containing "noise" irrelevant.
    struct KeywordJudge;

    #[async_trait]
    impl LanguageModel for KeywordJudge {
        async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
            if prompt.contains("noise") {
                Ok("NO".to_string())
            } else {
                Ok("YES".to_string())
            }
        }
    }

    struct FailingJudge;

    #[async_trait]
    impl LanguageModel for FailingJudge {
        async fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
            Err(GenerationError::Response("judge offline".to_string()))
        }
    }

    struct FixedIndex {
        hits: Vec<ScoredPassage>,
    }

    #[async_trait]
    impl VectorIndex for FixedIndex {
        fn location(&self) -> &str {
            "memory://fixed"
        }

        async fn add_passages(
            &self,
            _passages: &[Passage],
            _embeddings: &[Vec<f32>],
        ) -> Result<(), IndexError> {
            Ok(())
        }

        async fn search(
            &self,
            _query_vector: &[f32],
            top_k: usize,
        ) -> Result<Vec<ScoredPassage>, IndexError> {
            Ok(self.hits.iter().take(top_k).cloned().collect())
        }
    }

    fn hit(text: &str, page_number: u32, score: f64) -> ScoredPassage {
        ScoredPassage {
            passage: Passage {
                text: text.to_string(),
                page_number,
                source_id: "doc.pdf".to_string(),
            },
            score,
        }
    }

    #[tokio::test]
    async fn relevance_filter_keeps_similarity_order() {
        let index = FixedIndex {
            hits: vec![
                hit("pump maintenance steps", 1, 0.9),
                hit("pure noise here", 2, 0.8),
                hit("pump pressure table notes", 3, 0.7),
            ],
        };
        let retriever = Retriever::new(Arc::new(FakeEmbedder), Arc::new(KeywordJudge), 3);

        let retrieved = retriever.retrieve(&index, "pump upkeep").await.unwrap();
        assert_eq!(retrieved.len(), 2);
        assert_eq!(retrieved[0].passage.page_number, 1);
        assert_eq!(retrieved[1].passage.page_number, 3);
    }

    #[tokio::test]
    async fn all_candidates_may_be_judged_away() {
        let index = FixedIndex {
            hits: vec![hit("noise only", 1, 0.5)],
        };
        let retriever = Retriever::new(Arc::new(FakeEmbedder), Arc::new(KeywordJudge), 3);

        let retrieved = retriever.retrieve(&index, "anything").await.unwrap();
        assert!(retrieved.is_empty());
    }

    #[tokio::test]
    async fn judge_failure_fails_the_retrieval() {
        let index = FixedIndex {
            hits: vec![hit("some passage", 1, 0.5)],
        };
        let retriever = Retriever::new(Arc::new(FakeEmbedder), Arc::new(FailingJudge), 3);

        let result = retriever.retrieve(&index, "anything").await;
        assert!(matches!(result, Err(QueryError::Generation(_))));
    }

    #[tokio::test]
    async fn similarity_stage_honors_top_k() {
        let index = FixedIndex {
            hits: vec![
                hit("first", 1, 0.9),
                hit("second", 2, 0.8),
                hit("third", 3, 0.7),
            ],
        };
        let retriever = Retriever::new(Arc::new(FakeEmbedder), Arc::new(KeywordJudge), 2);

        let retrieved = retriever.retrieve(&index, "anything").await.unwrap();
        assert_eq!(retrieved.len(), 2);
    }
}
