use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::matching::MatchResult;

/// One uploaded file, owned by the upload handler for the duration of a request.
#[derive(Debug, Clone)]
pub struct UploadedResume {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Structured fields extracted from a resume transcript.
///
/// Every field may be empty; an uninformative record is still ranked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedResume {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Space-joined, normalized skill tokens in order of first appearance.
    pub skills: String,
}

impl ParsedResume {
    pub fn skill_count(&self) -> usize {
        self.skills.split_whitespace().count()
    }
}

/// Wire contract of `POST /upload/`.
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub parsed_data: ParsedResume,
    pub matched_jobs: Vec<MatchResult>,
}
