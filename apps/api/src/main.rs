mod config;
mod errors;
mod extraction;
mod fields;
mod matching;
mod models;
mod routes;
mod runner;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::{Config, EmbeddingBackend, NerBackend};
use crate::extraction::DocumentTextExtractor;
use crate::fields::recognizer::{EntityRecognizer, HeuristicRecognizer};
use crate::fields::skills::SkillVocabulary;
use crate::matching::hashing::HashingEmbedder;
use crate::matching::{CatalogIndex, Embedder, JobCatalog};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http=info",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Matcher API v{}", env!("CARGO_PKG_VERSION"));

    // Skill vocabulary (a missing dataset is fatal)
    let vocabulary = Arc::new(SkillVocabulary::load(&config.skills_path)?);

    // Job catalog
    let catalog = match &config.jobs_path {
        Some(path) => JobCatalog::load(path)?,
        None => JobCatalog::builtin()?,
    };
    info!("Job catalog loaded ({} postings)", catalog.len());

    // Models
    let embedder = build_embedder(config.embedding_backend).await?;
    let recognizer = build_recognizer(config.ner_backend).await?;
    info!(
        "Embedder: {}, entity recognizer: {}",
        embedder.name(),
        recognizer.name()
    );

    // Precompute catalog embeddings once; requests only embed the resume
    let catalog = Arc::new(CatalogIndex::build(catalog, embedder.as_ref()).await?);

    // Build app state
    let state = AppState {
        config: config.clone(),
        text_extractor: Arc::new(DocumentTextExtractor),
        recognizer,
        vocabulary,
        embedder,
        catalog,
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()), // browser upload form is served from another origin
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_embedder(backend: EmbeddingBackend) -> Result<Arc<dyn Embedder>> {
    match backend {
        EmbeddingBackend::Hashing => Ok(Arc::new(HashingEmbedder)),
        #[cfg(feature = "bert")]
        EmbeddingBackend::MiniLm => Ok(Arc::new(matching::minilm::MiniLmEmbedder::spawn().await?)),
        #[cfg(not(feature = "bert"))]
        EmbeddingBackend::MiniLm => {
            anyhow::bail!("EMBEDDING_BACKEND=minilm requires building with `--features bert`")
        }
    }
}

async fn build_recognizer(backend: NerBackend) -> Result<Arc<dyn EntityRecognizer>> {
    match backend {
        NerBackend::Heuristic => Ok(Arc::new(HeuristicRecognizer)),
        #[cfg(feature = "bert")]
        NerBackend::Bert => Ok(Arc::new(fields::bert::BertRecognizer::spawn().await?)),
        #[cfg(not(feature = "bert"))]
        NerBackend::Bert => anyhow::bail!("NER_BACKEND=bert requires building with `--features bert`"),
    }
}
