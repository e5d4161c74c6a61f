//! Similarity ranking: orders the job catalog by embedding similarity to a skill string.
//!
//! Default embedder: `HashingEmbedder` (pure Rust, deterministic, no model download).
//! With the `bert` feature: `MiniLmEmbedder` (all-MiniLM-L6-v2 sentence embeddings).
//!
//! `AppState` holds an `Arc<dyn Embedder>` and an `Arc<CatalogIndex>` whose job
//! embeddings are computed once at startup.

pub mod catalog;
pub mod hashing;
#[cfg(feature = "bert")]
pub mod minilm;
pub mod ranker;

use async_trait::async_trait;

use crate::errors::AppError;

pub use catalog::{CatalogIndex, JobCatalog, JobPosting};
pub use ranker::{rank, rank_jobs, MatchResult};

/// A fixed-length vector representation of a text.
pub type Embedding = Vec<f32>;

/// Turns texts into embeddings. Output order matches input order.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>, AppError>;

    fn name(&self) -> &'static str;
}
