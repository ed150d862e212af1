use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{LoginRequest, LoginResponse};
use crate::services::TokenError;
use crate::state::AppState;

/// Issues an access token for any non-empty username. There is no password
/// and no user table.
pub async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let username = match payload {
        Ok(Json(LoginRequest { username: Some(username) })) => username,
        Ok(_) => return Err(AppError::validation("Username is required")),
        Err(e) => {
            warn!(error = %e, "Unreadable login body");
            return Err(AppError::validation("Username is required"));
        }
    };

    let access_token = state.tokens.issue(&username).map_err(|e| match e {
        TokenError::EmptyUsername => AppError::validation("Username is required"),
        other => AppError::internal(other.to_string()),
    })?;

    info!(username = %username, "Issued access token");
    Ok(Json(LoginResponse { access_token }))
}
