mod assistant;
mod config;
mod embedding;
mod errors;
mod ingest;
mod intent;
mod llm_client;
mod rag;
mod routes;
mod state;
mod vector_store;

#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assistant::Assistant;
use crate::config::Config;
use crate::embedding::{Embedder, HttpEmbedder};
use crate::ingest::loader::PdfLoader;
use crate::ingest::splitter::TextSplitter;
use crate::ingest::IngestionStage;
use crate::intent::IntentClassifier;
use crate::llm_client::{LanguageModel, LlmClient};
use crate::rag::engine::QueryEngine;
use crate::rag::fallback::FallbackPolicy;
use crate::rag::history::ConversationLog;
use crate::rag::ontology::Ontology;
use crate::routes::build_router;
use crate::state::AppState;
use crate::vector_store::{JsonVectorStore, VectorIndex};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Orange-HR assistant v{}", env!("CARGO_PKG_VERSION"));

    // Initialize embedder
    let http_embedder =
        HttpEmbedder::new(config.embedding_url.clone(), config.embedding_model.clone())?;
    info!(
        "Embedder initialized (model: {}, endpoint: {})",
        http_embedder.model(),
        config.embedding_url
    );
    let embedder: Arc<dyn Embedder> = Arc::new(http_embedder);

    // Initialize vector store
    let store = JsonVectorStore::open(&config.vector_store_path).await?;
    info!("Vector store opened at {}", store.path().display());
    let index: Arc<dyn VectorIndex> = Arc::new(store);

    // Initialize LLM client
    let llm: Arc<dyn LanguageModel> = Arc::new(LlmClient::new(config.groq_api_key.clone())?);
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Ingest PDFs before serving if the index is empty
    let splitter = TextSplitter::new(config.chunk_size, config.chunk_overlap);
    info!(
        "Splitter: chunk_size={}, chunk_overlap={}",
        splitter.chunk_size(),
        splitter.chunk_overlap()
    );
    let ingestion = Arc::new(IngestionStage::new(
        config.data_dir.clone(),
        splitter,
        Arc::new(PdfLoader),
        embedder.clone(),
        index.clone(),
    ));
    let report = ingestion.ensure_ingested().await?;
    info!("Startup ingestion: {:?}", report);

    // Build the query pipeline around one shared conversation log
    let log = Arc::new(ConversationLog::new());
    let ontology = Ontology::new(config.ontology_match);
    info!(
        "Retrieval: top_k={}, distance_threshold={}, keyword matching={:?}",
        config.top_k,
        config.distance_threshold,
        ontology.matching()
    );
    let fallback = FallbackPolicy::new(llm.clone(), ontology, log.clone());
    let engine = QueryEngine::new(
        embedder,
        index.clone(),
        llm,
        fallback,
        log,
        config.retrieval(),
    );

    // Build app state
    let state = AppState {
        assistant: Arc::new(Assistant::new(IntentClassifier::new(), engine)),
        ingestion,
        index,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
