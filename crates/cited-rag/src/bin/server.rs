//! Cited RAG server binary
//!
//! Run with: cargo run -p cited-rag --bin cited-rag-server

use cited_rag::{
    config::{BackendProvider, RagConfig},
    providers::OllamaClient,
    server::RagServer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cited_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                     Cited RAG Server                      ║
║       Reranked retrieval with model fallback & citations  ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    let config = RagConfig::load()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Backend: {:?}", config.backend);
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - Generation models: {}", config.generation.models.join(", "));
    tracing::info!(
        "  - Chunk size: {} (overlap {})",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );
    tracing::info!("  - top_k={}, top_n={}", config.retrieval.top_k, config.retrieval.top_n);

    if config.backend == BackendProvider::Ollama {
        let ollama = OllamaClient::new(&config.embeddings, &config.generation)?;
        if ollama.health_check().await {
            tracing::info!("Ollama is running at {}", config.generation.ollama_base_url);
        } else {
            tracing::warn!("Ollama not available at {}", config.generation.ollama_base_url);
            tracing::warn!("  Start it with: ollama serve");
        }
    }

    let server = RagServer::new(config)?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/ingest - Chunk, embed and store text");
    println!("  POST /api/chat   - Ask questions");
    println!("  GET  /api/info   - Server info");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
