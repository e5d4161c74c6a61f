//! Skill vocabulary: the fixed reference list skills are matched against.
//!
//! Loaded once at startup from an ESCO-style CSV (`conceptUri`, `preferredLabel`,
//! `altLabels`). Alternative labels resolve to their preferred label, so "ML" and
//! "machine learning" both surface as `machine-learning` when the CSV links them.

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

const ID_COLUMNS: &[&str] = &["conceptUri", "id", "skill_id"];
const LABEL_COLUMNS: &[&str] = &["preferredLabel", "label", "skill"];
const ALT_LABEL_COLUMNS: &[&str] = &["altLabels"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skill {
    /// Source identifiers are kept for tracing matches back to the dataset.
    #[allow(dead_code)]
    pub id: String,
    #[allow(dead_code)]
    pub label: String,
    /// Lower-cased, hyphen-joined form emitted in `ParsedResume::skills`.
    pub normalized: String,
}

#[derive(Debug, Default)]
pub struct SkillVocabulary {
    skills: Vec<Skill>,
    /// Token sequence of a preferred or alternative label → index into `skills`.
    phrases: HashMap<Vec<String>, usize>,
    longest_phrase: usize,
}

impl SkillVocabulary {
    /// Loads the vocabulary CSV. A missing or empty file is fatal for the caller.
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Skills dataset not found at '{}'", path.display()))?;
        let vocabulary = Self::from_reader(file)
            .with_context(|| format!("Invalid skills dataset '{}'", path.display()))?;

        info!(
            "Loaded {} skills ({} phrases) from {}",
            vocabulary.len(),
            vocabulary.phrases.len(),
            path.display()
        );
        Ok(vocabulary)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = csv_reader.headers()?.clone();

        let find = |candidates: &[&str]| {
            headers
                .iter()
                .position(|h| candidates.iter().any(|c| h.trim().eq_ignore_ascii_case(c)))
        };
        let Some(id_col) = find(ID_COLUMNS) else {
            bail!("missing skill identifier column (one of {ID_COLUMNS:?})");
        };
        let Some(label_col) = find(LABEL_COLUMNS) else {
            bail!("missing skill label column (one of {LABEL_COLUMNS:?})");
        };
        let alt_col = find(ALT_LABEL_COLUMNS);

        let mut vocabulary = SkillVocabulary::default();
        for record in csv_reader.records() {
            let record = record?;
            let label = record.get(label_col).unwrap_or_default().trim();
            let alt_labels = alt_col
                .and_then(|c| record.get(c))
                .map(split_alt_labels)
                .unwrap_or_default();
            vocabulary.insert(record.get(id_col).unwrap_or_default().trim(), label, &alt_labels);
        }

        if vocabulary.is_empty() {
            bail!("no usable skill rows");
        }
        Ok(vocabulary)
    }

    /// Adds a skill unless its label tokenizes to nothing. The first row to claim
    /// a phrase keeps it.
    pub fn insert(&mut self, id: &str, label: &str, alt_labels: &[&str]) {
        let tokens = tokenize(label);
        if tokens.is_empty() {
            return;
        }

        let index = self.skills.len();
        self.skills.push(Skill {
            id: id.to_string(),
            label: label.to_string(),
            normalized: tokens.join("-"),
        });

        for phrase in std::iter::once(tokens).chain(alt_labels.iter().map(|a| tokenize(a))) {
            if phrase.is_empty() {
                continue;
            }
            self.longest_phrase = self.longest_phrase.max(phrase.len());
            self.phrases.entry(phrase).or_insert(index);
        }
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Matches the longest vocabulary phrase at each token position, left to right.
    /// Returns each matched skill once, in order of first appearance.
    pub fn match_skills(&self, text: &str) -> Vec<&Skill> {
        let tokens = tokenize(text);
        let mut seen = HashSet::new();
        let mut matched = Vec::new();

        let mut i = 0;
        while i < tokens.len() {
            let max_len = self.longest_phrase.min(tokens.len() - i);
            let hit = (1..=max_len)
                .rev()
                .find_map(|n| self.phrases.get(&tokens[i..i + n]).map(|&idx| (idx, n)));

            match hit {
                Some((idx, n)) => {
                    if seen.insert(idx) {
                        matched.push(&self.skills[idx]);
                    }
                    i += n;
                }
                None => i += 1,
            }
        }

        matched
    }
}

/// ESCO separates alternative labels with newlines; hand-made CSVs tend to use `;`.
fn split_alt_labels(raw: &str) -> Vec<&str> {
    raw.split(|c| c == '\n' || c == ';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Lower-cased word tokens. `+`, `#` and inner `.` are kept so `c++`, `c#` and
/// `node.js` survive; everything else separates tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.')))
        .map(|t| t.trim_matches('.'))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}
