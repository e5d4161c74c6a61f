use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::matching::{Embedder, Embedding};

pub const DIMENSIONS: usize = 512;

const UNIGRAM_WEIGHT: f32 = 1.0;
const BIGRAM_WEIGHT: f32 = 0.5;
const CHAR_GRAM_WEIGHT: f32 = 0.2;
const CHAR_GRAM_LEN: usize = 4;

const STOP_WORDS: &[&str] = &[
    "a", "about", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "have", "in",
    "into", "is", "it", "its", "of", "on", "or", "our", "that", "the", "their", "this", "to",
    "we", "with", "you", "your", "will", "who", "looking", "join", "team", "experience",
    "work", "working", "need", "needs",
];

/// Feature-hashing bag-of-words embedder.
///
/// Lower-cases, strips punctuation and stop words, then hashes unigrams, bigrams and
/// character 4-grams into `DIMENSIONS` buckets with `1 + ln(tf)` weighting. The
/// vector is L2-normalized and never has negative components, so cosine similarity
/// between two of its embeddings is always in [0, 1].
pub struct HashingEmbedder;

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>, AppError> {
        Ok(texts.iter().map(|t| embed_text(t)).collect())
    }

    fn name(&self) -> &'static str {
        "hashing"
    }
}

pub fn embed_text(text: &str) -> Embedding {
    let terms = terms(text);
    // (feature hash, bucket) -> (occurrences, feature weight)
    let mut features: BTreeMap<(u64, usize), (f32, f32)> = BTreeMap::new();

    let mut add = |feature: &str, weight: f32| {
        let hash = fnv1a(feature.as_bytes());
        let entry = features
            .entry((hash, (hash % DIMENSIONS as u64) as usize))
            .or_insert((0.0, weight));
        entry.0 += 1.0;
    };

    for term in &terms {
        add(term.as_str(), UNIGRAM_WEIGHT);

        let padded: Vec<char> = format!(" {term} ").chars().collect();
        for gram in padded.windows(CHAR_GRAM_LEN) {
            let gram: String = gram.iter().collect();
            add(format!("#{gram}").as_str(), CHAR_GRAM_WEIGHT);
        }
    }
    for pair in terms.windows(2) {
        add(format!("{} {}", pair[0], pair[1]).as_str(), BIGRAM_WEIGHT);
    }

    let mut vector = vec![0.0_f32; DIMENSIONS];
    for ((_, bucket), (occurrences, weight)) in features {
        vector[bucket] += weight * (1.0 + occurrences.ln());
    }

    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|v| *v /= norm);
    }
    vector
}

/// Lower-cased, stemmed terms without punctuation or stop words. Hyphenated skill
/// tokens split into their parts so `machine-learning` meets "machine learning".
fn terms(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|t| !t.is_empty() && !STOP_WORDS.contains(t))
        .map(stem)
        .collect()
}

/// Light suffix stripping so inflections share a term: "developers" and "developer",
/// "libraries" and "library", "modeling" and "model". Short tokens and tokens with
/// digits or symbols (`c++`, `s3`) are left alone.
fn stem(term: &str) -> String {
    if term.len() <= 3 || !term.chars().all(char::is_alphabetic) {
        return term.to_string();
    }

    if let Some(base) = term.strip_suffix("ies") {
        return format!("{base}y");
    }
    if let Some(base) = term.strip_suffix("sses") {
        return format!("{base}ss");
    }
    if term.len() >= 6 {
        if let Some(base) = term.strip_suffix("ing") {
            return base.to_string();
        }
    }
    if term.ends_with('s') && !(term.ends_with("ss") || term.ends_with("us") || term.ends_with("is")) {
        return term[..term.len() - 1].to_string();
    }
    term.to_string()
}

/// 64-bit FNV-1a; stable across runs and platforms, unlike `DefaultHasher`.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, b| (hash ^ u64::from(*b)).wrapping_mul(PRIME))
}
