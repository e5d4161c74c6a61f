use std::sync::Arc;

use crate::config::Config;
use crate::extraction::TextExtractor;
use crate::fields::recognizer::EntityRecognizer;
use crate::fields::skills::SkillVocabulary;
use crate::matching::{CatalogIndex, Embedder};

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Everything behind these `Arc`s is loaded once at startup and never mutated,
/// so handlers share it without locking.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub text_extractor: Arc<dyn TextExtractor>,
    pub recognizer: Arc<dyn EntityRecognizer>,
    pub vocabulary: Arc<SkillVocabulary>,
    pub embedder: Arc<dyn Embedder>,
    /// Job catalog with precomputed description embeddings.
    pub catalog: Arc<CatalogIndex>,
}
