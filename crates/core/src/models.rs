use crate::chunking::ChunkerConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of passages fetched per query before relevance filtering.
pub const DEFAULT_TOP_K: usize = 3;

/// Structured message returned when a query arrives before any upload.
pub const NO_DOCUMENT_MESSAGE: &str = "No PDF uploaded yet.";

/// Text of one PDF page, as produced by extraction. Pages that contain
/// only whitespace never become a `PageUnit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageUnit {
    pub text: String,
    pub page_number: u32,
    pub source_id: String,
}

/// A chunk of page text with its citation metadata, the atomic unit stored
/// in and retrieved from an index. `(source_id, page_number)` always equal
/// those of the originating page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,
    pub page_number: u32,
    pub source_id: String,
}

/// A passage returned by similarity search, with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPassage {
    pub passage: Passage,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRequest {
    pub query: String,
}

/// Success payload of the upload path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReport {
    pub passages_indexed: usize,
    pub index_location: String,
    pub checksum: String,
    pub ingested_at: DateTime<Utc>,
}

impl UploadReport {
    pub fn message(&self) -> String {
        format!(
            "PDF uploaded and vector store created with {} chunks.",
            self.passages_indexed
        )
    }
}

/// Query-path payload: exactly one of `answer` or `error` is set. A query
/// before any upload yields `error` inside an otherwise successful
/// response, never a fault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AskResponse {
    pub fn answered(answer: impl Into<String>) -> Self {
        Self {
            answer: Some(answer.into()),
            error: None,
        }
    }

    pub fn no_document() -> Self {
        Self {
            answer: None,
            error: Some(NO_DOCUMENT_MESSAGE.to_string()),
        }
    }
}

/// Lifecycle of the document session: `Ready` is the only state in which
/// queries are answered from an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    NoDocument,
    Indexing,
    Ready,
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub chunker: ChunkerConfig,
    pub top_k: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            chunker: ChunkerConfig::default(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_document_response_serializes_without_answer_field() {
        let response = AskResponse::no_document();
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"error":"No PDF uploaded yet."}"#);
    }

    #[test]
    fn answered_response_carries_no_error() {
        let response = AskResponse::answered("42");
        assert_eq!(response.answer.as_deref(), Some("42"));
        assert!(response.error.is_none());
    }

    #[test]
    fn question_request_parses_the_query_field() {
        let request: QuestionRequest =
            serde_json::from_str(r#"{"query":"what changed in v2?"}"#).unwrap();
        assert_eq!(request.query, "what changed in v2?");
    }

    #[test]
    fn upload_report_message_counts_passages() {
        let report = UploadReport {
            passages_indexed: 7,
            index_location: "memory://x".to_string(),
            checksum: "abc".to_string(),
            ingested_at: Utc::now(),
        };
        assert_eq!(
            report.message(),
            "PDF uploaded and vector store created with 7 chunks."
        );
    }
}
