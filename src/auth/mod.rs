pub mod password;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::AuthConfig;

pub use password::{hash_password, verify_password, PasswordError};

/// Minimum HMAC secret length in bytes
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
    pub kind: TokenKind,
    pub iss: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token expiry
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT secret must be at least {} bytes", MIN_SECRET_LEN)]
    WeakSecret,

    #[error("JWT generation error: {0}")]
    Generation(jsonwebtoken::errors::Error),

    #[error("Invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),

    #[error("Token kind mismatch: expected {expected:?}")]
    WrongKind { expected: TokenKind },
}

/// Mints and validates HS256 access/refresh tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Result<Self, TokenError> {
        let secret = config.jwt_secret.as_bytes();
        if secret.len() < MIN_SECRET_LEN {
            return Err(TokenError::WeakSecret);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            issuer: config.jwt_issuer.clone(),
            access_ttl: Duration::minutes(config.access_token_expiry_mins),
            refresh_ttl: Duration::minutes(config.refresh_token_expiry_mins),
        })
    }

    fn claims(&self, user_id: Uuid, email: &str, username: &str, kind: TokenKind) -> Claims {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        Claims {
            user_id,
            email: email.to_string(),
            username: username.to_string(),
            kind,
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(TokenError::Generation)
    }

    pub fn issue_pair(
        &self,
        user_id: Uuid,
        email: &str,
        username: &str,
    ) -> Result<TokenPair, TokenError> {
        let access = self.claims(user_id, email, username, TokenKind::Access);
        let refresh = self.claims(user_id, email, username, TokenKind::Refresh);
        let expires_at = DateTime::from_timestamp(access.exp, 0).unwrap_or_else(Utc::now);
        Ok(TokenPair {
            access_token: self.sign(&access)?,
            refresh_token: self.sign(&refresh)?,
            expires_at,
        })
    }

    /// Verify signature, issuer and time claims; only HS256 is accepted.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.validate_nbf = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "nbf", "iss"]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(TokenError::Invalid)?;
        Ok(data.claims)
    }

    pub fn validate_kind(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let claims = self.validate(token)?;
        if claims.kind != expected {
            return Err(TokenError::WrongKind { expected });
        }
        Ok(claims)
    }
}
