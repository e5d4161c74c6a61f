use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Which `Embedder` implementation ranks the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    Hashing,
    MiniLm,
}

impl FromStr for EmbeddingBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hashing" => Ok(EmbeddingBackend::Hashing),
            "minilm" => Ok(EmbeddingBackend::MiniLm),
            other => bail!("Unknown EMBEDDING_BACKEND '{other}' (expected 'hashing' or 'minilm')"),
        }
    }
}

/// Which `EntityRecognizer` implementation finds the candidate's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NerBackend {
    Heuristic,
    Bert,
}

impl FromStr for NerBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heuristic" => Ok(NerBackend::Heuristic),
            "bert" => Ok(NerBackend::Bert),
            other => bail!("Unknown NER_BACKEND '{other}' (expected 'heuristic' or 'bert')"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if a value is present but invalid.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub skills_path: PathBuf,
    /// `None` selects the catalog compiled into the binary.
    pub jobs_path: Option<PathBuf>,
    pub max_upload_bytes: usize,
    pub embedding_backend: EmbeddingBackend,
    pub ner_backend: NerBackend,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            skills_path: std::env::var("SKILLS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_skills_path()),
            jobs_path: std::env::var("JOBS_PATH").ok().map(PathBuf::from),
            max_upload_bytes: match std::env::var("MAX_UPLOAD_BYTES") {
                Ok(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a positive integer")?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
            embedding_backend: optional_env("EMBEDDING_BACKEND", "hashing").parse()?,
            ner_backend: optional_env("NER_BACKEND", "heuristic").parse()?,
        })
    }
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// The vocabulary shipped with the crate, used when `SKILLS_PATH` is unset.
pub fn default_skills_path() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/data/skills.csv"))
}

#[cfg(test)]
impl Config {
    /// Defaults without touching the process environment.
    pub fn for_tests() -> Self {
        Config {
            port: 0,
            rust_log: "debug".to_string(),
            skills_path: default_skills_path(),
            jobs_path: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            embedding_backend: EmbeddingBackend::Hashing,
            ner_backend: NerBackend::Heuristic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_names_parse_case_insensitively() {
        assert_eq!(
            "MiniLM".parse::<EmbeddingBackend>().unwrap(),
            EmbeddingBackend::MiniLm
        );
        assert_eq!(
            " hashing ".parse::<EmbeddingBackend>().unwrap(),
            EmbeddingBackend::Hashing
        );
        assert_eq!("BERT".parse::<NerBackend>().unwrap(), NerBackend::Bert);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let err = "word2vec".parse::<EmbeddingBackend>().unwrap_err();
        assert!(err.to_string().contains("word2vec"));
        assert!("spacy".parse::<NerBackend>().is_err());
    }

    #[test]
    fn test_default_skills_path_points_at_shipped_csv() {
        assert!(default_skills_path().ends_with("data/skills.csv"));
        assert!(default_skills_path().exists());
    }
}
