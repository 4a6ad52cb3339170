use crate::error::{IngestError, QueryError};
use crate::ingest::{build_passages, digest_file, digest_pages, prepare_pages};
use crate::models::{AskResponse, PageUnit, Passage, PipelineOptions, SessionState, UploadReport};
use crate::prompt::{answer_prompt, format_context};
use crate::retriever::Retriever;
use crate::traits::{Embedder, IndexProvider, LanguageModel, VectorIndex};
use chrono::Utc;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;

struct ActiveIndex {
    index: Arc<dyn VectorIndex>,
    passage_count: usize,
}

/// Owns the whole upload and query paths for one document session. The
/// active index is the only shared mutable state: it is swapped with a
/// single write after a replacement index is fully built, so a concurrent
/// query sees either the old index or the new one, never a partial one.
/// Concurrent uploads are allowed; the last completed swap wins.
pub struct QaCoordinator {
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn LanguageModel>,
    indexes: Arc<dyn IndexProvider>,
    retriever: Retriever,
    options: PipelineOptions,
    active: RwLock<Option<Arc<ActiveIndex>>>,
    uploads_in_flight: AtomicUsize,
}

impl QaCoordinator {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn LanguageModel>,
        indexes: Arc<dyn IndexProvider>,
        options: PipelineOptions,
    ) -> Self {
        let retriever = Retriever::new(Arc::clone(&embedder), Arc::clone(&llm), options.top_k);
        Self {
            embedder,
            llm,
            indexes,
            retriever,
            options,
            active: RwLock::new(None),
            uploads_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn state(&self) -> SessionState {
        if self.uploads_in_flight.load(Ordering::SeqCst) > 0 {
            return SessionState::Indexing;
        }
        if self.active.read().is_some() {
            SessionState::Ready
        } else {
            SessionState::NoDocument
        }
    }

    /// Passage count of the active index, if any.
    pub fn indexed_passages(&self) -> Option<usize> {
        self.active.read().as_ref().map(|active| active.passage_count)
    }

    pub async fn upload_pdf(&self, path: &Path) -> Result<UploadReport, IngestError> {
        let _indexing = IndexingGuard::enter(&self.uploads_in_flight);
        let checksum = digest_file(path)?;
        let passages = build_passages(path, &self.options.chunker)?;
        self.activate(passages, checksum).await
    }

    /// Indexes pages that were extracted elsewhere, running the same
    /// normalize → filter → chunk → embed → index pipeline.
    pub async fn index_pages(&self, pages: Vec<PageUnit>) -> Result<UploadReport, IngestError> {
        let _indexing = IndexingGuard::enter(&self.uploads_in_flight);
        let checksum = digest_pages(&pages);
        let passages = prepare_pages(pages, &self.options.chunker)?;
        self.activate(passages, checksum).await
    }

    async fn activate(
        &self,
        passages: Vec<Passage>,
        checksum: String,
    ) -> Result<UploadReport, IngestError> {
        let (embeddings, index) = tokio::try_join!(
            async {
                if passages.is_empty() {
                    return Ok::<_, IngestError>(Vec::new());
                }
                let texts: Vec<String> =
                    passages.iter().map(|passage| passage.text.clone()).collect();
                Ok(self.embedder.embed_batch(&texts).await?)
            },
            async {
                Ok::<_, IngestError>(
                    self.indexes
                        .create_index(self.embedder.dimensions())
                        .await?,
                )
            },
        )?;

        index.add_passages(&passages, &embeddings).await?;

        let report = UploadReport {
            passages_indexed: passages.len(),
            index_location: index.location().to_string(),
            checksum,
            ingested_at: Utc::now(),
        };

        let built = Arc::new(ActiveIndex {
            index,
            passage_count: passages.len(),
        });
        *self.active.write() = Some(built);

        info!(
            passages = report.passages_indexed,
            location = %report.index_location,
            "index activated"
        );
        Ok(report)
    }

    /// Answers a question against the active index. "No document yet" is a
    /// successful response carrying an error message, not a fault; real
    /// failures (embedding, search, generation) surface as `QueryError`
    /// and leave the active index untouched.
    pub async fn ask(&self, query: &str) -> Result<AskResponse, QueryError> {
        match self.answer(query).await {
            Ok(answer) => Ok(AskResponse::answered(answer)),
            Err(QueryError::NoIndex) => Ok(AskResponse::no_document()),
            Err(error) => Err(error),
        }
    }

    async fn answer(&self, query: &str) -> Result<String, QueryError> {
        let active = self.active.read().clone().ok_or(QueryError::NoIndex)?;

        let retrieved = self
            .retriever
            .retrieve(active.index.as_ref(), query)
            .await?;
        let passages: Vec<Passage> = retrieved
            .into_iter()
            .map(|scored| scored.passage)
            .collect();

        let context = format_context(&passages);
        let prompt = answer_prompt(&context, query);
        let answer = self.llm.complete(&prompt).await?;
        Ok(answer)
    }
}

struct IndexingGuard<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> IndexingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self { counter }
    }
}

impl Drop for IndexingGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}
