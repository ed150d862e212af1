pub mod analyze;
pub mod auth;
pub mod health;
pub mod upload;

pub use analyze::*;
pub use auth::*;
pub use health::*;
pub use upload::*;

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{auth_middleware, logging_middleware};
use crate::state::AppState;

// Room for multipart boundaries and part headers around the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Builds the full application router. `/api/upload` and `/api/analyze`
/// require a bearer token; everything else is open.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_file_size_bytes() + MULTIPART_OVERHEAD_BYTES;

    let protected = Router::new()
        .route("/api/upload", post(upload_handler))
        .route("/api/analyze", post(analyze_handler))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/login", post(login_handler))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(from_fn(logging_middleware)),
        )
        .with_state(state)
}
