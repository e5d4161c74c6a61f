use anyhow::anyhow;
use async_trait::async_trait;
use rust_bert::pipelines::sentence_embeddings::{
    SentenceEmbeddingsBuilder, SentenceEmbeddingsModel, SentenceEmbeddingsModelType,
};

use crate::errors::AppError;
use crate::matching::{Embedder, Embedding};
use crate::runner::ModelRunner;

/// all-MiniLM-L6-v2 sentence embeddings (384 dimensions).
///
/// Embeddings may have negative components; the ranker clips cosine scores to [0, 1].
/// The model runs on its own thread because it is not `Sync`.
pub struct MiniLmEmbedder {
    runner: ModelRunner<Vec<String>, Result<Vec<Embedding>, String>>,
}

impl MiniLmEmbedder {
    pub async fn spawn() -> anyhow::Result<Self> {
        let runner = ModelRunner::spawn(
            "sentence embedding model (all-MiniLM-L6-v2)",
            || {
                Ok(
                    SentenceEmbeddingsBuilder::remote(SentenceEmbeddingsModelType::AllMiniLmL6V2)
                        .create_model()?,
                )
            },
            |model: &SentenceEmbeddingsModel, texts: Vec<String>| {
                model.encode(&texts).map_err(|e| e.to_string())
            },
        )
        .await?;

        Ok(Self { runner })
    }
}

#[async_trait]
impl Embedder for MiniLmEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>, AppError> {
        self.runner
            .call(texts.to_vec())
            .await?
            .map_err(|e| AppError::Internal(anyhow!("embedding failed: {e}")))
    }

    fn name(&self) -> &'static str {
        "minilm"
    }
}
