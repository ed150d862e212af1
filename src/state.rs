use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::services::{
    Analyzer, CompletionClient, InMemoryStore, MongoStore, OpenAiClient, RecordStore, TokenService,
};

/// Shared application state injected into route handlers via axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn RecordStore>,
    pub analyzer: Analyzer,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn RecordStore>, client: Arc<dyn CompletionClient>) -> Self {
        let analyzer = Analyzer::new(client, config.ai_timeout());
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl_seconds);
        Self {
            config: Arc::new(config),
            store,
            analyzer,
            tokens,
        }
    }

    /// Wires the production collaborators described by `config`.
    pub async fn from_config(config: Config) -> Result<Self> {
        let store: Arc<dyn RecordStore> = match config.mongodb_uri.as_deref() {
            Some(uri) => Arc::new(
                MongoStore::connect(uri, &config.mongodb_database)
                    .await
                    .context("Failed to configure MongoDB store")?,
            ),
            None => {
                warn!("Using in-memory resume store");
                Arc::new(InMemoryStore::new())
            }
        };

        let client = OpenAiClient::new(&config).context("Failed to build completion client")?;
        info!(
            store = store.backend(),
            ai_configured = client.is_configured(),
            "Application state initialised"
        );

        Ok(Self::new(config, store, Arc::new(client)))
    }
}
