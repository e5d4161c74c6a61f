use async_trait::async_trait;
use rust_bert::pipelines::ner::NERModel;

use crate::errors::AppError;
use crate::fields::recognizer::{Entity, EntityLabel, EntityRecognizer};
use crate::runner::ModelRunner;

/// Pretrained BERT token-classification model (CoNLL-03 labels).
///
/// The model is not `Sync`, so it lives on a dedicated thread and requests
/// reach it over a channel.
pub struct BertRecognizer {
    runner: ModelRunner<String, Vec<Entity>>,
}

impl BertRecognizer {
    /// Downloads and loads the model on its runner thread; fails if it cannot load.
    pub async fn spawn() -> anyhow::Result<Self> {
        let runner = ModelRunner::spawn(
            "NER model",
            || Ok(NERModel::new(Default::default())?),
            |model: &NERModel, text: String| {
                model
                    .predict_full_entities(&[text.as_str()])
                    .into_iter()
                    .next()
                    .unwrap_or_default()
                    .into_iter()
                    .map(|e| Entity {
                        text: e.word,
                        label: map_label(&e.label),
                    })
                    .collect()
            },
        )
        .await?;

        Ok(Self { runner })
    }
}

fn map_label(label: &str) -> EntityLabel {
    match label.trim_start_matches("B-").trim_start_matches("I-") {
        "PER" => EntityLabel::Person,
        "ORG" => EntityLabel::Organization,
        "LOC" => EntityLabel::Location,
        _ => EntityLabel::Other,
    }
}

#[async_trait]
impl EntityRecognizer for BertRecognizer {
    async fn recognize(&self, text: &str) -> Result<Vec<Entity>, AppError> {
        self.runner.call(text.to_string()).await
    }

    fn name(&self) -> &'static str {
        "bert-ner"
    }
}
