//! Turns an uploaded PDF or DOCX into a plain-text transcript.
//!
//! `AppState` holds an `Arc<dyn TextExtractor>`; the default `DocumentTextExtractor`
//! dispatches on `DocumentFormat` and runs the CPU-bound parse inside
//! `tokio::task::spawn_blocking`.

pub mod docx;
pub mod pdf;

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::warn;

use crate::errors::AppError;

const PDF_MIME: &str = "application/pdf";
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// The only document formats the service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Resolves the format from the declared content type, falling back to the
    /// filename extension when the client sent no type or a generic binary one.
    pub fn detect(content_type: Option<&str>, filename: &str) -> Result<Self, AppError> {
        let mime = content_type
            .map(|ct| {
                ct.split(';')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_ascii_lowercase()
            })
            .filter(|ct| !ct.is_empty());

        match mime.as_deref() {
            Some(PDF_MIME) => Ok(DocumentFormat::Pdf),
            Some(DOCX_MIME) => Ok(DocumentFormat::Docx),
            None | Some("application/octet-stream") => Self::from_extension(filename),
            Some(other) => Err(AppError::UnsupportedFormat(format!(
                "content type '{other}' is not supported; upload a PDF or DOCX file"
            ))),
        }
    }

    fn from_extension(filename: &str) -> Result<Self, AppError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|v| v.to_str())
            .map(|v| v.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            _ => Err(AppError::UnsupportedFormat(format!(
                "file '{filename}' is not a PDF or DOCX document"
            ))),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }
}

/// Produces a plain-text transcript from raw document bytes.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, format: DocumentFormat, bytes: Bytes) -> Result<String, AppError>;
}

/// Default extractor backed by `pdf-extract` and a `zip` + `quick-xml` DOCX reader.
pub struct DocumentTextExtractor;

#[async_trait]
impl TextExtractor for DocumentTextExtractor {
    async fn extract(&self, format: DocumentFormat, bytes: Bytes) -> Result<String, AppError> {
        let text = tokio::task::spawn_blocking(move || extract_text(format, &bytes))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("text extraction task failed: {e}")))??;

        if text.trim().is_empty() {
            warn!(format = format.label(), "Document parsed but contained no text");
        }
        Ok(text)
    }
}

/// Synchronous dispatch by format. Malformed input maps to `AppError::Parse`.
pub fn extract_text(format: DocumentFormat, data: &[u8]) -> Result<String, AppError> {
    match format {
        DocumentFormat::Pdf => pdf::extract_pdf_text(data),
        DocumentFormat::Docx => docx::extract_docx_text(data),
    }
    .map_err(|e| AppError::Parse(format!("could not read {} document: {e}", format.label())))
}
