//! Named-entity recognition, behind a swappable trait.
//!
//! Default: `HeuristicRecognizer` (layout rules over the resume header, deterministic).
//! With the `bert` feature: `BertRecognizer` (pretrained token-classification model).

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityLabel {
    Person,
    Organization,
    Location,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
}

impl Entity {
    pub fn person(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: EntityLabel::Person,
        }
    }
}

/// Labels spans of a transcript. Entities are returned in document order.
#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    async fn recognize(&self, text: &str) -> Result<Vec<Entity>, AppError>;

    fn name(&self) -> &'static str;
}

/// Lines searched for a name when there is no explicit `Name:` label.
const HEADER_LINES: usize = 5;

static NAME_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*(?:full\s+)?name\s*[:\-]\s*(.+?)\s*$").unwrap());

/// Finds the candidate's name from resume layout conventions: an explicit
/// `Name:` line, otherwise a short capitalized line at the top of the document.
pub struct HeuristicRecognizer;

#[async_trait]
impl EntityRecognizer for HeuristicRecognizer {
    async fn recognize(&self, text: &str) -> Result<Vec<Entity>, AppError> {
        Ok(recognize_people(text))
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

pub fn recognize_people(text: &str) -> Vec<Entity> {
    let mut people = Vec::new();

    for caps in NAME_LABEL_RE.captures_iter(text) {
        let candidate = caps[1].trim();
        if looks_like_person_name(candidate) {
            people.push(Entity::person(candidate));
        }
    }

    for line in text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(HEADER_LINES)
    {
        if looks_like_person_name(line) && !people.iter().any(|p| p.text == line) {
            people.push(Entity::person(line));
        }
    }

    people
}

/// 2–4 words, each starting with an uppercase letter, letters and `'.-` only.
fn looks_like_person_name(line: &str) -> bool {
    if line.contains('@') || line.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    if !(2..=4).contains(&words.len()) {
        return false;
    }

    words.iter().all(|word| {
        let mut chars = word.chars();
        let starts_upper = chars.next().is_some_and(char::is_uppercase);
        starts_upper && word.chars().all(|c| c.is_alphabetic() || "'.-".contains(c))
    })
}
