use crate::error::IndexError;
use crate::models::{Passage, ScoredPassage};
use crate::traits::{IndexProvider, VectorIndex};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use url::Url;
use uuid::Uuid;

/// Creates one Qdrant collection per upload. Collection names are
/// uuid-suffixed so no upload ever reuses another upload's storage.
pub struct QdrantProvider {
    endpoint: String,
    collection_prefix: String,
    client: Client,
}

impl QdrantProvider {
    pub fn new(
        endpoint: &str,
        collection_prefix: impl Into<String>,
    ) -> Result<Self, IndexError> {
        let parsed = Url::parse(endpoint)?;
        Ok(Self {
            endpoint: parsed.as_str().trim_end_matches('/').to_string(),
            collection_prefix: collection_prefix.into(),
            client: Client::new(),
        })
    }
}

#[async_trait]
impl IndexProvider for QdrantProvider {
    async fn create_index(&self, dimensions: usize) -> Result<Arc<dyn VectorIndex>, IndexError> {
        let collection = format!("{}-{}", self.collection_prefix, Uuid::new_v4());

        let response = self
            .client
            .put(format!("{}/collections/{}", self.endpoint, collection))
            .json(&json!({
                "vectors": { "size": dimensions, "distance": "Cosine" }
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IndexError::BackendResponse {
                backend: "qdrant".to_string(),
                details: response.status().to_string(),
            });
        }

        Ok(Arc::new(QdrantIndex {
            endpoint: self.endpoint.clone(),
            collection,
            client: self.client.clone(),
            vector_size: dimensions,
        }))
    }
}

pub struct QdrantIndex {
    endpoint: String,
    collection: String,
    client: Client,
    vector_size: usize,
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    fn location(&self) -> &str {
        &self.collection
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

        let points = passages
            .iter()
            .zip(embeddings.iter())
            .enumerate()
            .map(|(position, (passage, embedding))| {
                if embedding.len() != self.vector_size {
                    return Err(IndexError::Request(format!(
                        "embedding dimension {} != {}",
                        embedding.len(),
                        self.vector_size
                    )));
                }

                Ok(json!({
                    "id": position as u64,
                    "vector": embedding,
                    "payload": {
                        "source_id": passage.source_id,
                        "page_number": passage.page_number,
                        "text": passage.text,
                    },
                }))
            })
            .collect::<Result<Vec<_>, IndexError>>()?;

        if points.is_empty() {
            return Ok(());
        }

        let response = self
            .client
            .put(format!(
                "{}/collections/{}/points?wait=true",
                self.endpoint, self.collection
            ))
            .json(&json!({ "points": points }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IndexError::BackendResponse {
                backend: "qdrant".to_string(),
                details: response.status().to_string(),
            });
        }

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

        let response = self
            .client
            .post(format!(
                "{}/collections/{}/points/search",
                self.endpoint, self.collection
            ))
            .json(&json!({
                "vector": query_vector,
                "limit": top_k,
                "with_payload": true,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IndexError::BackendResponse {
                backend: "qdrant".to_string(),
                details: response.status().to_string(),
            });
        }

        let parsed: Value = response.json().await?;
        let hits = parsed
            .pointer("/result")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut results = Vec::new();
        for hit in hits {
            let text = hit
                .pointer("/payload/text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let source_id = hit
                .pointer("/payload/source_id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let page_number = hit
                .pointer("/payload/page_number")
                .and_then(Value::as_u64)
                .unwrap_or(0) as u32;
            let score = hit.pointer("/score").and_then(Value::as_f64).unwrap_or(0.0);

            results.push(ScoredPassage {
                passage: Passage {
                    text,
                    page_number,
                    source_id,
                },
                score,
            });
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_rejects_malformed_endpoints() {
        let result = QdrantProvider::new("not a url", "pdf_qa");
        assert!(matches!(result, Err(IndexError::Url(_))));
    }

    #[test]
    fn provider_normalizes_trailing_slashes() {
        let provider = QdrantProvider::new("http://localhost:6333/", "pdf_qa").unwrap();
        assert_eq!(provider.endpoint, "http://localhost:6333");
    }
}
