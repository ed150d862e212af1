use std::env;
use std::fmt;
use std::time::Duration;
use anyhow::{Result, Context};
use tracing::{info, warn};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MONGODB_DATABASE: &str = "resume_analyzer";
pub const MAX_TOKEN_TTL_SECONDS: u64 = 30 * 24 * 60 * 60;

// A .docx body part may decompress to at most this multiple of the upload limit.
const DOCUMENT_EXPANSION_FACTOR: usize = 8;

#[derive(Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub max_file_size_mb: usize,
    pub jwt_secret: String,
    pub token_ttl_seconds: u64,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub ai_timeout_seconds: u64,
    pub mongodb_uri: Option<String>,
    pub mongodb_database: String,
    pub store_timeout_seconds: u64,
}

// Secrets are reported by presence only.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("max_file_size_mb", &self.max_file_size_mb)
            .field("jwt_secret_set", &!self.jwt_secret.is_empty())
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("openai_api_key_set", &self.openai_api_key.is_some())
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field("ai_timeout_seconds", &self.ai_timeout_seconds)
            .field("mongodb_uri_set", &self.mongodb_uri.is_some())
            .field("mongodb_database", &self.mongodb_database)
            .field("store_timeout_seconds", &self.store_timeout_seconds)
            .finish()
    }
}

impl Config {
    /// Defaults for everything except the signing secret, which has none.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Config {
            server_host: "0.0.0.0".to_string(),
            server_port: 5000,
            max_file_size_mb: 10,
            jwt_secret: jwt_secret.into(),
            token_ttl_seconds: 3600,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            ai_timeout_seconds: 30,
            mongodb_uri: None,
            mongodb_database: DEFAULT_MONGODB_DATABASE.to_string(),
            store_timeout_seconds: 5,
        }
    }

    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let jwt_secret = Self::optional_var("JWT_SECRET")
            .context("JWT_SECRET must be set to sign access tokens")?;
        let defaults = Self::with_secret(jwt_secret);

        let config = Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| {
                info!("SERVER_HOST not set, using default: {}", defaults.server_host);
                defaults.server_host.clone()
            }),
            server_port: Self::parse_env_var("SERVER_PORT", defaults.server_port)
                .context("Failed to parse SERVER_PORT")?,
            max_file_size_mb: Self::parse_env_var("MAX_FILE_SIZE_MB", defaults.max_file_size_mb)
                .context("Failed to parse MAX_FILE_SIZE_MB")?,
            token_ttl_seconds: Self::parse_env_var("TOKEN_TTL_SECONDS", defaults.token_ttl_seconds)
                .context("Failed to parse TOKEN_TTL_SECONDS")?,
            openai_api_key: Self::optional_var("OPENAI_API_KEY"),
            openai_base_url: Self::optional_var("OPENAI_BASE_URL")
                .unwrap_or_else(|| defaults.openai_base_url.clone()),
            openai_model: Self::optional_var("OPENAI_MODEL")
                .unwrap_or_else(|| defaults.openai_model.clone()),
            ai_timeout_seconds: Self::parse_env_var("AI_TIMEOUT_SECONDS", defaults.ai_timeout_seconds)
                .context("Failed to parse AI_TIMEOUT_SECONDS")?,
            mongodb_uri: Self::optional_var("MONGODB_URI"),
            mongodb_database: Self::optional_var("MONGODB_DATABASE")
                .unwrap_or_else(|| defaults.mongodb_database.clone()),
            store_timeout_seconds: Self::parse_env_var("STORE_TIMEOUT_SECONDS", defaults.store_timeout_seconds)
                .context("Failed to parse STORE_TIMEOUT_SECONDS")?,
            jwt_secret: defaults.jwt_secret,
        };

        config.validate()?;

        if config.openai_api_key.is_none() {
            warn!("OPENAI_API_KEY not set, resume analysis will always return the fallback result");
        }
        if config.mongodb_uri.is_none() {
            warn!("MONGODB_URI not set, resume records are kept in memory only");
        }

        info!("Configuration loaded successfully: {:?}", config);
        Ok(config)
    }

    fn optional_var(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_env_var<T>(var_name: &str, default: T) -> Result<T>
    where
        T: std::str::FromStr + Copy + std::fmt::Debug,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(val) => match val.trim().parse() {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {} (using default: {:?})", var_name, e, default);
                    Ok(default)
                }
            },
            Err(_) => {
                info!("{} not set, using default: {:?}", var_name, default);
                Ok(default)
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server_port == 0 {
            return Err(anyhow::anyhow!("SERVER_PORT must be greater than 0"));
        }
        if self.max_file_size_mb == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }
        if self.jwt_secret.is_empty() {
            return Err(anyhow::anyhow!("JWT_SECRET must not be empty"));
        }
        if self.token_ttl_seconds == 0 {
            return Err(anyhow::anyhow!("TOKEN_TTL_SECONDS must be greater than 0"));
        }
        if self.token_ttl_seconds > MAX_TOKEN_TTL_SECONDS {
            return Err(anyhow::anyhow!(
                "TOKEN_TTL_SECONDS must be at most {}",
                MAX_TOKEN_TTL_SECONDS
            ));
        }
        if self.ai_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("AI_TIMEOUT_SECONDS must be greater than 0"));
        }
        if self.store_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("STORE_TIMEOUT_SECONDS must be greater than 0"));
        }
        Ok(())
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_mb * 1024 * 1024
    }

    /// Upper bound on the decompressed size of a document's text part.
    pub fn max_document_bytes(&self) -> usize {
        self.max_file_size_bytes().saturating_mul(DOCUMENT_EXPANSION_FACTOR)
    }

    pub fn ai_timeout(&self) -> Duration {
        Duration::from_secs(self.ai_timeout_seconds)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_seconds)
    }
}
