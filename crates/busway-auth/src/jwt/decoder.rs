//! JWT token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use busway_core::config::AuthConfig;
use busway_core::error::AppError;

use super::claims::{Claims, TokenType};

/// Validates HS256 tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates an access token.
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        self.decode_typed(token, TokenType::Access)
    }

    /// Decodes and validates an email-verification token.
    pub fn decode_verification_token(&self, token: &str) -> Result<Claims, AppError> {
        self.decode_typed(token, TokenType::Verification)
    }

    fn decode_typed(&self, token: &str, expected: TokenType) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::authentication("Token has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::authentication("Invalid token signature")
                }
                _ => AppError::authentication("Invalid token"),
            })?
            .claims;

        if claims.token_type != expected {
            return Err(AppError::authentication("Invalid token type"));
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use busway_entity::user::{Theme, User, UserRole};

    use super::*;
    use crate::jwt::JwtEncoder;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "Mai".into(),
            email: "mai@example.com".into(),
            password_hash: String::new(),
            is_verified: false,
            role: UserRole::User,
            language: "en".into(),
            theme: Theme::Light,
            profile_picture: None,
            bio: None,
            push_token: None,
            posts_count: 0,
            comments_count: 0,
            likes_received: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn access_token_round_trips() {
        let config = AuthConfig::default();
        let user = user();
        let issued = JwtEncoder::new(&config).access_token(&user).unwrap();
        let claims = JwtDecoder::new(&config)
            .decode_access_token(&issued.token)
            .unwrap();
        assert_eq!(claims.user_id(), user.id);
        assert_eq!(claims.email, "mai@example.com");
    }

    #[test]
    fn verification_token_is_not_an_access_token() {
        let config = AuthConfig::default();
        let issued = JwtEncoder::new(&config).verification_token(&user()).unwrap();
        let err = JwtDecoder::new(&config)
            .decode_access_token(&issued.token)
            .unwrap_err();
        assert_eq!(err.kind, busway_core::error::ErrorKind::Authentication);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let issued = JwtEncoder::new(&AuthConfig::default())
            .access_token(&user())
            .unwrap();
        let other = AuthConfig {
            jwt_secret: "another-secret".into(),
            ..AuthConfig::default()
        };
        assert!(JwtDecoder::new(&other).decode_access_token(&issued.token).is_err());
    }
}
