use serde::Serialize;

use crate::errors::AppError;
use crate::matching::{CatalogIndex, Embedder, JobPosting};

/// A job posting paired with its similarity to the resume's skills.
/// Serialized flat: `{title, company, location, description, similarity_score}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    #[serde(flatten)]
    pub job: JobPosting,
    /// Cosine similarity clipped to [0, 1].
    pub similarity_score: f32,
}

/// Embeds `skill_text` and ranks the whole catalog against it.
///
/// Empty skill text is not an error: it embeds to a zero vector, every job scores
/// 0.0 and the catalog comes back in its original order.
pub async fn rank_jobs(
    skill_text: &str,
    embedder: &dyn Embedder,
    index: &CatalogIndex,
) -> Result<Vec<MatchResult>, AppError> {
    let query = embedder
        .embed(&[skill_text.to_string()])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("embedder returned no vector")))?;

    Ok(rank(&query, index))
}

/// Scores every catalog entry against `query` and sorts by descending score.
/// The sort is stable, so ties keep catalog order.
pub fn rank(query: &[f32], index: &CatalogIndex) -> Vec<MatchResult> {
    let mut results: Vec<MatchResult> = index
        .entries()
        .map(|(job, embedding)| MatchResult {
            job: job.clone(),
            similarity_score: cosine_similarity(query, embedding),
        })
        .collect();

    results.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
    results
}

/// Cosine similarity clipped to [0, 1]. Zero-norm or mismatched vectors score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0_f32, 0.0_f32, 0.0_f32), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let score = dot / (norm_a.sqrt() * norm_b.sqrt());
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}
