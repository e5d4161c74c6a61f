use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::matching::{Embedder, Embedding};

const BUILTIN_CATALOG: &str = include_str!("../../data/jobs.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
}

/// The static set of postings available for matching. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct JobCatalog {
    jobs: Vec<JobPosting>,
}

impl JobCatalog {
    pub fn new(jobs: Vec<JobPosting>) -> Result<Self> {
        if jobs.is_empty() {
            bail!("job catalog is empty");
        }
        Ok(Self { jobs })
    }

    /// Loads a JSON array of postings from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Job catalog not found at '{}'", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Invalid job catalog '{}'", path.display()))
    }

    /// The catalog compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG).context("Invalid built-in job catalog")
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let jobs: Vec<JobPosting> = serde_json::from_str(raw)?;
        Self::new(jobs)
    }

    pub fn jobs(&self) -> &[JobPosting] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }
}

/// A catalog paired with one precomputed embedding per job description.
/// Built once at startup and shared read-only by every request.
#[derive(Debug)]
pub struct CatalogIndex {
    catalog: JobCatalog,
    embeddings: Vec<Embedding>,
}

impl CatalogIndex {
    pub async fn build(catalog: JobCatalog, embedder: &dyn Embedder) -> Result<Self> {
        let descriptions: Vec<String> = catalog
            .jobs()
            .iter()
            .map(|job| job.description.clone())
            .collect();

        let embeddings = embedder
            .embed(&descriptions)
            .await
            .map_err(|e| anyhow::anyhow!("failed to embed job catalog: {e}"))?;
        if embeddings.len() != catalog.len() {
            bail!(
                "embedder returned {} vectors for {} jobs",
                embeddings.len(),
                catalog.len()
            );
        }

        info!(
            "Embedded {} job descriptions with '{}' embedder",
            catalog.len(),
            embedder.name()
        );
        Ok(Self {
            catalog,
            embeddings,
        })
    }

    pub fn catalog(&self) -> &JobCatalog {
        &self.catalog
    }

    /// Jobs paired with their embeddings, in catalog order.
    pub fn entries(&self) -> impl Iterator<Item = (&JobPosting, &Embedding)> {
        self.catalog.jobs().iter().zip(self.embeddings.iter())
    }
}
