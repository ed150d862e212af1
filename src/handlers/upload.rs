use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::error::{AppError, AppResult};
use crate::middleware::current_request_id;
use crate::models::{ResumeRecord, UploadResponse, UploadedDocument};
use crate::services::{match_skills, Claims, TextExtractor};
use crate::state::AppState;

pub const RESUME_FIELD: &str = "resume";

/// Extract, match, persist, analyze. Only extraction problems reach the
/// client as errors; storage and analysis degrade quietly.
pub async fn upload_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadResponse>> {
    let start = Instant::now();
    let request_id = current_request_id().unwrap_or_default();

    info!(request_id = %request_id, username = %claims.username, "Starting resume upload request");

    let mut multipart = multipart.map_err(|e| {
        warn!(request_id = %request_id, error = %e, "Request body is not multipart");
        AppError::MissingFile
    })?;

    let limit_mb = state.config.max_file_size_mb;
    let file = extract_file_from_multipart(&mut multipart, limit_mb)
        .await?
        .ok_or(AppError::MissingFile)?;

    info!(
        request_id = %request_id,
        file_name = %file.name,
        file_size = file.size,
        "File extracted from multipart form"
    );

    if file.size > state.config.max_file_size_bytes() {
        warn!(request_id = %request_id, file_size = file.size, "File size exceeds limit");
        return Err(AppError::FileTooLarge { limit_mb });
    }

    if file.kind().is_none() {
        warn!(request_id = %request_id, file_name = %file.name, "Unsupported file format");
        return Err(AppError::UnsupportedFormat);
    }

    let filename = file.name.clone();
    let result = TextExtractor::new()
        .with_max_document_bytes(state.config.max_document_bytes())
        .extract_text(file)
        .await?;
    let text = result.text;

    let skills = match_skills(&text);
    info!(
        request_id = %request_id,
        kind = %result.kind,
        pages = ?result.pages,
        text_length = text.len(),
        skills = ?skills,
        "Text extracted and skills matched"
    );

    let record = ResumeRecord::new(filename, text.clone(), skills.clone());
    persist_record(&state, &record, &request_id).await;

    let ai_analysis = state.analyzer.score_resume(&text).await;

    info!(
        request_id = %request_id,
        score = ?ai_analysis.score,
        total_time_ms = start.elapsed().as_millis() as u64,
        "Request completed successfully"
    );

    Ok(Json(UploadResponse {
        text,
        skills,
        ai_analysis,
    }))
}

/// Returns the first `resume` file, or `None` when it is empty or absent.
/// Later `resume` parts and other fields are ignored.
async fn extract_file_from_multipart(
    multipart: &mut Multipart,
    limit_mb: usize,
) -> AppResult<Option<UploadedDocument>> {
    let read_error = |e: axum::extract::multipart::MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::FileTooLarge { limit_mb }
        } else {
            AppError::validation(format!("Failed to read upload: {}", e.body_text()))
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(read_error)? {
        if field.name() != Some(RESUME_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        let file_name = field.file_name().unwrap_or("").to_string();
        let content_type = field.content_type().map(|ct| ct.to_string());
        let data = field.bytes().await.map_err(read_error)?;

        if data.is_empty() {
            return Ok(None);
        }

        let mut file = UploadedDocument::new(file_name, data.to_vec());
        if let Some(mime_type) = content_type {
            file = file.with_mime_type(mime_type);
        }
        return Ok(Some(file));
    }

    Ok(None)
}

/// Persistence is advisory: failures and timeouts are logged, never returned.
async fn persist_record(state: &AppState, record: &ResumeRecord, request_id: &str) {
    let timeout = state.config.store_timeout();
    match tokio::time::timeout(timeout, state.store.insert(record)).await {
        Ok(Ok(())) => {
            debug!(request_id = %request_id, backend = state.store.backend(), "Resume record stored");
        }
        Ok(Err(e)) => {
            error!(request_id = %request_id, error = %e, "Failed to store resume record");
        }
        Err(_) => {
            error!(request_id = %request_id, timeout_ms = timeout.as_millis() as u64, "Resume record store timed out");
        }
    }
}
