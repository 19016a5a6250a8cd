//! Ingestion server binary
//!
//! Run with: cargo run -p docflow --bin docflow-server [config.toml]

use docflow::{config::PipelineConfig, server::IngestServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docflow=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                         Docflow                           ║
║        Event-Driven Document Ingestion Pipeline           ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    let config = match std::env::args().nth(1) {
        Some(path) => PipelineConfig::load(&path)?,
        None => PipelineConfig::default(),
    };

    tracing::info!("Configuration loaded");
    tracing::info!("  - Object store: {}", config.object_store.endpoint);
    tracing::info!("  - Embedding service: {}", config.embedding.endpoint);
    tracing::info!("  - Classifier backend: {:?}", config.classifier.backend);
    tracing::info!("  - Search index: {} ({})", config.search_index.endpoint, config.search_index.index);
    tracing::info!(
        "  - Chunking: {} chars, {} overlap",
        config.chunking.max_chars,
        config.chunking.overlap
    );

    // Surface dead dependencies early; the pipeline still starts without them.
    let probe = reqwest::Client::new();
    match probe.get(&config.search_index.endpoint).send().await {
        Ok(resp) if resp.status().is_success() || resp.status().is_client_error() => {
            tracing::info!("Search index reachable");
        }
        _ => {
            tracing::warn!(
                "Search index not reachable at {}; chunk writes will fail until it is up",
                config.search_index.endpoint
            );
        }
    }

    let server = IngestServer::new(config)?;

    println!("\nServer starting...");
    println!("  Webhook: http://{}/events", server.address());
    println!("  Health:  http://{}/health", server.address());
    println!("  Stats:   http://{}/api/stats", server.address());
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
