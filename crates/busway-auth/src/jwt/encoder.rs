//! JWT token creation.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use busway_core::config::AuthConfig;
use busway_core::error::AppError;
use busway_entity::user::User;

use super::claims::{Claims, TokenType};

/// Creates signed HS256 tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    access_ttl: Duration,
    verification_ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl", &self.access_ttl)
            .field("verification_ttl", &self.verification_ttl)
            .finish()
    }
}

/// A signed token and its expiry.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IssuedToken {
    /// Compact JWT.
    pub token: String,
    /// Expiry.
    pub expires_at: DateTime<Utc>,
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl: Duration::hours(config.jwt_access_ttl_hours as i64),
            verification_ttl: Duration::hours(config.verification_ttl_hours as i64),
        }
    }

    /// Issues an API access token.
    pub fn access_token(&self, user: &User) -> Result<IssuedToken, AppError> {
        self.issue(user, TokenType::Access, self.access_ttl)
    }

    /// Issues an email-verification token.
    pub fn verification_token(&self, user: &User) -> Result<IssuedToken, AppError> {
        self.issue(user, TokenType::Verification, self.verification_ttl)
    }

    fn issue(&self, user: &User, token_type: TokenType, ttl: Duration) -> Result<IssuedToken, AppError> {
        let now = Utc::now();
        let expires_at = now + ttl;
        let claims = Claims {
            sub: user.id,
            role: user.role,
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            token_type,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))?;

        Ok(IssuedToken { token, expires_at })
    }
}
