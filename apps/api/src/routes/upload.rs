//! POST /upload/: resume in, parsed fields and ranked jobs out.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use tracing::{field::Empty, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::DocumentFormat;
use crate::fields::extract_fields;
use crate::matching::rank_jobs;
use crate::models::resume::{UploadResponse, UploadedResume};
use crate::state::AppState;

const FILE_FIELD: &str = "file";

/// POST /upload/
///
/// Pipeline: read multipart `file` → extract text → extract fields → rank catalog.
/// Client mistakes (format, corrupt document, missing field) come back as 4xx;
/// anything else is a 500 scoped to this request.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let span = info_span!(
        "upload",
        request_id = %Uuid::new_v4(),
        filename = Empty,
        bytes = Empty
    );

    async move {
        let result = receive_and_process(&state, multipart).await;
        if let Err(e) = &result {
            warn!(status = e.status().as_u16(), "Upload rejected: {e}");
        }
        result.map(Json)
    }
    .instrument(span)
    .await
}

async fn receive_and_process(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadResponse, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::Validation(e.body_text()))?;
    let upload = read_upload(&mut multipart).await?;

    let span = Span::current();
    span.record("filename", upload.filename.as_str());
    span.record("bytes", upload.bytes.len());

    process_upload(state, upload).await
}

/// Reads the first `file` field; other fields are skipped.
async fn read_upload(multipart: &mut Multipart) -> Result<UploadedResume, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;

        if bytes.is_empty() {
            return Err(AppError::Validation("uploaded file is empty".to_string()));
        }
        return Ok(UploadedResume {
            filename,
            content_type,
            bytes,
        });
    }

    Err(AppError::Validation(format!(
        "multipart body has no '{FILE_FIELD}' field"
    )))
}

async fn process_upload(
    state: &AppState,
    upload: UploadedResume,
) -> Result<UploadResponse, AppError> {
    let format = DocumentFormat::detect(upload.content_type.as_deref(), &upload.filename)?;

    let text = state.text_extractor.extract(format, upload.bytes).await?;
    let parsed_data =
        extract_fields(&text, state.recognizer.as_ref(), state.vocabulary.as_ref()).await?;
    let matched_jobs = rank_jobs(
        &parsed_data.skills,
        state.embedder.as_ref(),
        state.catalog.as_ref(),
    )
    .await?;

    info!(
        format = format.label(),
        chars = text.len(),
        skills = parsed_data.skill_count(),
        top_match = matched_jobs.first().map(|m| m.job.title.as_str()).unwrap_or("-"),
        "Resume processed"
    );

    Ok(UploadResponse {
        filename: upload.filename,
        parsed_data,
        matched_jobs,
    })
}
