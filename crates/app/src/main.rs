use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use pdf_qa_core::{
    build_passages, openai, ChunkerConfig, IndexProvider, MemoryIndexProvider, OpenAiClient,
    OpenAiConfig, PipelineOptions, QaCoordinator, QdrantProvider,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pdf-qa", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// OpenAI-compatible API base URL
    #[arg(long, default_value = openai::DEFAULT_BASE_URL)]
    openai_base_url: String,

    /// API key for the embedding/chat backend
    #[arg(long, env = "OPENAI_API_KEY", default_value = "")]
    api_key: String,

    /// Chat model used for relevance judging and answer generation
    #[arg(long, default_value = openai::DEFAULT_CHAT_MODEL)]
    chat_model: String,

    /// Embedding model
    #[arg(long, default_value = openai::DEFAULT_EMBEDDING_MODEL)]
    embedding_model: String,

    /// Embedding vector dimensions
    #[arg(long, default_value = "1536")]
    embedding_dimensions: usize,

    /// Qdrant base URL; omit to keep the index in process memory
    #[arg(long)]
    qdrant_url: Option<String>,

    /// Prefix for the per-upload Qdrant collections
    #[arg(long, default_value = "pdf_qa")]
    qdrant_collection_prefix: String,

    /// Maximum passage size in characters
    #[arg(long, default_value = "600")]
    chunk_size: usize,

    /// Overlap between adjacent passages in characters
    #[arg(long, default_value = "120")]
    chunk_overlap: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest a PDF and answer one or more questions against it.
    Ask {
        /// PDF file to upload
        #[arg(long)]
        pdf: PathBuf,

        /// Question(s), answered in order
        #[arg(long = "query", required = true)]
        queries: Vec<String>,

        /// Passages fetched per question before relevance filtering
        #[arg(long, default_value = "3")]
        top_k: usize,
    },
    /// Extract, filter, and chunk a PDF without embedding or indexing.
    Inspect {
        /// PDF file to inspect
        #[arg(long)]
        pdf: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "pdf-qa boot"
    );

    let chunker = ChunkerConfig {
        chunk_size: cli.chunk_size,
        chunk_overlap: cli.chunk_overlap,
    };

    match cli.command {
        Command::Ask { pdf, queries, top_k } => {
            if cli.api_key.is_empty() {
                anyhow::bail!("an API key is required (--api-key or OPENAI_API_KEY)");
            }

            let config = OpenAiConfig {
                base_url: cli.openai_base_url,
                api_key: cli.api_key,
                chat_model: cli.chat_model,
                embedding_model: cli.embedding_model,
                embedding_dimensions: cli.embedding_dimensions,
            };
            let client =
                Arc::new(OpenAiClient::new(config).context("failed to build model client")?);

            let indexes: Arc<dyn IndexProvider> = match &cli.qdrant_url {
                Some(url) => Arc::new(
                    QdrantProvider::new(url, &cli.qdrant_collection_prefix)
                        .context("failed to configure qdrant provider")?,
                ),
                None => Arc::new(MemoryIndexProvider),
            };

            let options = PipelineOptions { chunker, top_k };
            let coordinator =
                QaCoordinator::new(client.clone(), client.clone(), indexes, options);

            let report = coordinator
                .upload_pdf(&pdf)
                .await
                .with_context(|| format!("failed to ingest {}", pdf.display()))?;
            info!(
                passages = report.passages_indexed,
                location = %report.index_location,
                "pdf indexed"
            );
            println!("{}", report.message());

            for query in queries {
                match coordinator.ask(&query).await {
                    Ok(response) => {
                        println!("Q: {query}");
                        if let Some(answer) = response.answer {
                            println!("A: {answer}\n");
                        } else if let Some(error) = response.error {
                            println!("error: {error}\n");
                        }
                    }
                    Err(error) => warn!(%query, error = %error, "query failed"),
                }
            }
        }
        Command::Inspect { pdf } => {
            let passages = build_passages(&pdf, &chunker)
                .with_context(|| format!("failed to process {}", pdf.display()))?;

            let mut per_page: BTreeMap<u32, usize> = BTreeMap::new();
            for passage in &passages {
                *per_page.entry(passage.page_number).or_default() += 1;
            }

            println!("{}: {} passages", pdf.display(), passages.len());
            for (page, count) in per_page {
                println!("  page {page}: {count} passage(s)");
            }
        }
    }

    Ok(())
}
