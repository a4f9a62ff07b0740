//! Signed, expiring access and refresh tokens.
//!
//! Tokens are HS512 JWTs. The claims carry the user id and the token kind so a
//! refresh token cannot be presented where an access token is expected.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::TokenConfig;

#[derive(Debug, Error)]
pub enum TokenError {
    /// Bad signature, expired, malformed, or of the wrong kind.
    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// What a token asserts about its bearer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub user_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    user_id: i32,
    kind: TokenKind,
    iat: i64,
    exp: i64,
}

pub trait TokenService: Send + Sync {
    fn issue_access(&self, payload: TokenPayload) -> Result<String, TokenError>;

    fn issue_refresh(&self, payload: TokenPayload) -> Result<String, TokenError>;

    /// Verifies signature, expiry and kind.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] for any token that fails verification.
    fn validate(&self, token: &str, kind: TokenKind) -> Result<TokenPayload, TokenError>;
}

pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_duration: Duration,
    refresh_duration: Duration,
}

impl JwtTokenService {
    #[must_use]
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS512);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(config.secret_key.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret_key.as_bytes()),
            validation,
            access_duration: Duration::minutes(config.access_duration_minutes),
            refresh_duration: Duration::minutes(config.refresh_duration_minutes),
        }
    }

    fn issue(
        &self,
        payload: TokenPayload,
        kind: TokenKind,
        lifetime: Duration,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            user_id: payload.user_id,
            kind,
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        };

        encode(&Header::new(Algorithm::HS512), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

impl TokenService for JwtTokenService {
    fn issue_access(&self, payload: TokenPayload) -> Result<String, TokenError> {
        self.issue(payload, TokenKind::Access, self.access_duration)
    }

    fn issue_refresh(&self, payload: TokenPayload) -> Result<String, TokenError> {
        self.issue(payload, TokenKind::Refresh, self.refresh_duration)
    }

    fn validate(&self, token: &str, kind: TokenKind) -> Result<TokenPayload, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        if data.claims.kind != kind {
            return Err(TokenError::Invalid(format!(
                "expected {kind:?} token, got {:?}",
                data.claims.kind
            )));
        }

        Ok(TokenPayload {
            user_id: data.claims.user_id,
        })
    }
}

/// Pulls the credentials out of an `Authorization` header value of the form
/// `Bearer <token>`. The scheme is matched case-insensitively and the value
/// must consist of exactly two space-separated parts.
#[must_use]
pub fn extract_bearer(header: &str) -> Option<&str> {
    let mut parts = header.split(' ');
    let scheme = parts.next()?;
    let token = parts.next()?;

    if parts.next().is_some() || token.is_empty() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    Some(token)
}
