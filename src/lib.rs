//! AI Resume Analyzer backend
//!
//! Accepts resume uploads (.pdf or .docx), extracts their text, matches a
//! fixed skill vocabulary, stores a record of each upload and asks a
//! language model for a score with short feedback.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use handlers::create_router;
pub use state::AppState;
