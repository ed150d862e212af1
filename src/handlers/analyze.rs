use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    Extension,
};
use tracing::{error, info, warn};

use crate::error::{AppError, AppResult};
use crate::middleware::current_request_id;
use crate::models::{AnalyzeRequest, JobMatch};
use crate::services::Claims;
use crate::state::AppState;

/// Compares already-extracted resume text with a job description.
pub async fn analyze_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> AppResult<Json<JobMatch>> {
    let Json(request) = payload.map_err(|e| {
        warn!(error = %e, "Unreadable analyze body");
        AppError::validation("Request body must be JSON with resumeText and jobDescription")
    })?;

    if request.resume_text.trim().is_empty() {
        return Err(AppError::validation("resumeText is required"));
    }
    if request.job_description.trim().is_empty() {
        return Err(AppError::validation("jobDescription is required"));
    }

    info!(
        request_id = %current_request_id().unwrap_or_default(),
        username = %claims.username,
        resume_length = request.resume_text.len(),
        job_length = request.job_description.len(),
        "Starting job match analysis"
    );

    let result = state
        .analyzer
        .match_job(&request.resume_text, &request.job_description)
        .await
        .map_err(|e| {
            error!(error = %e, "Job match analysis failed");
            AppError::AnalysisUnavailable { message: e.to_string() }
        })?;

    Ok(Json(result))
}
