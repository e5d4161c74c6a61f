//! Assembles a `ParsedResume` from a transcript.
//!
//! Email and phone come from regexes, the name from the configured
//! `EntityRecognizer`, skills from the `SkillVocabulary`. Missing fields are
//! left empty; nothing here fails a request except a recognizer error.

#[cfg(feature = "bert")]
pub mod bert;
pub mod recognizer;
pub mod skills;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::AppError;
use crate::models::resume::ParsedResume;
use recognizer::{EntityLabel, EntityRecognizer};
use skills::SkillVocabulary;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+").unwrap());

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+\d{1,3}[\s.-]?)?\(?\d{2,4}\)?[\s.-]?\d{3,4}[\s.-]?\d{3,4}").unwrap()
});

/// Section headings a recognizer may mistake for a person.
const NAME_FALSE_POSITIVES: [&str; 10] = [
    "experience",
    "education",
    "skills",
    "summary",
    "contact",
    "profile",
    "objective",
    "projects",
    "resume",
    "curriculum vitae",
];

const MIN_PHONE_DIGITS: usize = 10;

pub async fn extract_fields(
    text: &str,
    recognizer: &dyn EntityRecognizer,
    vocabulary: &SkillVocabulary,
) -> Result<ParsedResume, AppError> {
    let entities = recognizer.recognize(text).await?;
    let name = entities
        .into_iter()
        .filter(|e| e.label == EntityLabel::Person)
        .map(|e| e.text.trim().to_string())
        .find(|candidate| !is_false_positive_name(candidate));

    Ok(ParsedResume {
        name,
        email: extract_email(text),
        phone: extract_phone(text),
        skills: extract_skills(text, vocabulary),
    })
}

/// First email address in the text, without trailing sentence punctuation.
pub fn extract_email(text: &str) -> Option<String> {
    EMAIL_RE
        .find(text)
        .map(|m| m.as_str().trim_end_matches(&['.', '-'][..]).to_string())
}

/// First phone-like run with at least ten digits.
pub fn extract_phone(text: &str) -> Option<String> {
    PHONE_RE
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .find(|candidate| candidate.chars().filter(char::is_ascii_digit).count() >= MIN_PHONE_DIGITS)
        .map(str::to_string)
}

/// Space-joined, normalized skills in order of first appearance.
pub fn extract_skills(text: &str, vocabulary: &SkillVocabulary) -> String {
    vocabulary
        .match_skills(text)
        .iter()
        .map(|skill| skill.normalized.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_false_positive_name(candidate: &str) -> bool {
    candidate.is_empty()
        || NAME_FALSE_POSITIVES
            .iter()
            .any(|fp| candidate.eq_ignore_ascii_case(fp))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::recognizer::{Entity, HeuristicRecognizer};
    use super::*;

    fn vocabulary() -> SkillVocabulary {
        let mut vocab = SkillVocabulary::default();
        vocab.insert("1", "Python", &[]);
        vocab.insert("2", "Machine Learning", &["ML"]);
        vocab.insert("3", "SQL", &[]);
        vocab
    }

    struct FixedRecognizer(Vec<Entity>);

    #[async_trait]
    impl EntityRecognizer for FixedRecognizer {
        async fn recognize(&self, _text: &str) -> Result<Vec<Entity>, AppError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    #[test]
    fn test_email_extracted_exactly() {
        assert_eq!(
            extract_email("Contact: jane@example.com."),
            Some("jane@example.com".to_string())
        );
        assert_eq!(
            extract_email("a.b+cv@mail.uni-trier.de | 555"),
            Some("a.b+cv@mail.uni-trier.de".to_string())
        );
    }

    #[test]
    fn test_first_email_wins() {
        assert_eq!(
            extract_email("first@one.org second@two.org"),
            Some("first@one.org".to_string())
        );
    }

    #[test]
    fn test_missing_email_is_none() {
        assert_eq!(extract_email("no contact details, just @mentions"), None);
    }

    #[test]
    fn test_phone_formats() {
        assert_eq!(
            extract_phone("Phone: (555) 123-4567"),
            Some("(555) 123-4567".to_string())
        );
        assert_eq!(
            extract_phone("Tel +49 651 201 2345"),
            Some("+49 651 201 2345".to_string())
        );
    }

    #[test]
    fn test_years_are_not_phones() {
        assert_eq!(extract_phone("2019 - 2023, 40 hours"), None);
    }

    #[test]
    fn test_skills_joined_with_spaces() {
        assert_eq!(
            extract_skills("Skills: Python, Machine Learning, SQL", &vocabulary()),
            "python machine-learning sql"
        );
        assert_eq!(extract_skills("Woodworking", &vocabulary()), "");
    }

    #[tokio::test]
    async fn test_full_record() {
        let text = "Jane Doe\njane@example.com\n(555) 123-4567\nSkills: Python, ML, SQL";
        let parsed = extract_fields(text, &HeuristicRecognizer, &vocabulary())
            .await
            .unwrap();

        assert_eq!(
            parsed,
            ParsedResume {
                name: Some("Jane Doe".to_string()),
                email: Some("jane@example.com".to_string()),
                phone: Some("(555) 123-4567".to_string()),
                skills: "python machine-learning sql".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_section_headers_are_skipped_as_names() {
        let recognizer = FixedRecognizer(vec![
            Entity::person("Skills"),
            Entity {
                text: "Acme Corp".to_string(),
                label: EntityLabel::Organization,
            },
            Entity::person("Grace Hopper"),
        ]);
        let parsed = extract_fields("irrelevant", &recognizer, &vocabulary())
            .await
            .unwrap();
        assert_eq!(parsed.name.as_deref(), Some("Grace Hopper"));
    }

    #[tokio::test]
    async fn test_uninformative_text_yields_empty_record() {
        let parsed = extract_fields("lorem ipsum dolor", &HeuristicRecognizer, &vocabulary())
            .await
            .unwrap();
        assert_eq!(parsed, ParsedResume::default());
    }
}
