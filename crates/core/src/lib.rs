pub mod chunking;
pub mod error;
pub mod extractor;
pub mod filter;
pub mod ingest;
pub mod models;
pub mod openai;
pub mod orchestrator;
pub mod prompt;
pub mod retriever;
pub mod stores;
pub mod traits;

pub use chunking::{
    chunk_page, normalize_whitespace, split_text, ChunkerConfig, DEFAULT_CHUNK_OVERLAP,
    DEFAULT_CHUNK_SIZE,
};
pub use error::{
    EmbeddingError, ExtractionError, GenerationError, IndexError, IngestError, QueryError,
};
pub use extractor::{extract_page_texts, LopdfExtractor, PdfExtractor};
pub use filter::DocumentFilter;
pub use ingest::{build_passages, digest_file, digest_pages, prepare_pages};
pub use models::{
    AskResponse, PageUnit, Passage, PipelineOptions, QuestionRequest, ScoredPassage, SessionState,
    UploadReport, DEFAULT_TOP_K, NO_DOCUMENT_MESSAGE,
};
pub use openai::{OpenAiClient, OpenAiConfig};
pub use orchestrator::QaCoordinator;
pub use prompt::{answer_prompt, format_context, parse_relevance_verdict, relevance_prompt};
pub use retriever::Retriever;
pub use stores::{MemoryIndex, MemoryIndexProvider, QdrantIndex, QdrantProvider};
pub use traits::{Embedder, IndexProvider, LanguageModel, VectorIndex};
