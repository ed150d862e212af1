use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::error::AppError;
use crate::state::AppState;

/// Requires a valid bearer token and exposes its claims to handlers through
/// request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_string();
    let method = request.method().clone();

    debug!("Authenticating request: {} {}", method, path);

    let auth_header = match request.headers().get(AUTHORIZATION) {
        Some(header) => match header.to_str() {
            Ok(value) => value,
            Err(_) => {
                warn!("Invalid Authorization header format for {} {}", method, path);
                return Err(AppError::InvalidToken);
            }
        },
        None => {
            warn!("Missing Authorization header for {} {}", method, path);
            return Err(AppError::InvalidToken);
        }
    };

    let token = match auth_header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => token.trim(),
        _ => {
            warn!("Authorization header missing Bearer token for {} {}", method, path);
            return Err(AppError::InvalidToken);
        }
    };

    let claims = state.tokens.verify(token).map_err(|e| {
        warn!("Rejected access token for {} {}: {}", method, path, e);
        AppError::InvalidToken
    })?;

    debug!(username = %claims.username, "Authenticated {} {}", method, path);
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
