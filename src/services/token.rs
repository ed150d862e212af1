use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::MAX_TOKEN_TTL_SECONDS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("username is required")]
    EmptyUsername,

    #[error("token has expired")]
    Expired,

    #[error("token is invalid: {0}")]
    Invalid(jsonwebtoken::errors::Error),

    #[error("token could not be signed: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

/// Issues and verifies HS256 access tokens. Tokens carry only the username;
/// no identity store is consulted.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_seconds: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_seconds.min(MAX_TOKEN_TTL_SECONDS) as i64),
        }
    }

    pub fn issue(&self, username: &str) -> Result<String, TokenError> {
        self.issue_at(username, Utc::now())
    }

    pub fn issue_at(&self, username: &str, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        if username.trim().is_empty() {
            return Err(TokenError::EmptyUsername);
        }
        let claims = Claims {
            username: username.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Signing)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e),
            })
    }
}
