//! JWT token generation and validation.
//!
//! Tokens are issued by the identity provider in production; `generate_access_token`
//! exists for the seeder and tests.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use crate::auth::Claims;
use crate::config::JwtSettings;
use crate::types::UserId;

/// JWT configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in minutes.
    pub access_token_expires_minutes: i64,
}

impl From<&JwtSettings> for JwtConfig {
    fn from(settings: &JwtSettings) -> Self {
        Self {
            secret: settings.secret.clone(),
            access_token_expires_minutes: i64::try_from(settings.access_token_expiry_secs / 60)
                .unwrap_or(i64::MAX),
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            access_token_expires_minutes: 15,
        }
    }
}

/// Errors that can occur during JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    EncodingError(String),

    /// Token decoding failed.
    #[error("failed to decode token: {0}")]
    DecodingError(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,
}

/// JWT service for token operations.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("config", &self.config)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Creates a new JWT service with the given configuration.
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Generates an access token for a user.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn generate_access_token(&self, user_id: UserId, role: &str) -> Result<String, JwtError> {
        let expires_at = Utc::now() + Duration::minutes(self.config.access_token_expires_minutes);
        let claims = Claims::new(user_id, role, expires_at);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Validates and decodes a token.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` if the token has expired.
    /// Returns `JwtError::DecodingError` if the token is malformed or badly signed.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let validation = Validation::default();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::DecodingError(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_with_secret(secret: &str) -> JwtService {
        JwtService::new(JwtConfig {
            secret: secret.to_string(),
            access_token_expires_minutes: 15,
        })
    }

    #[test]
    fn test_issued_token_validates() {
        let service = service_with_secret("test-secret");
        let user_id = UserId::new();

        let token = service.generate_access_token(user_id, "estimator").unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.role, "estimator");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let issuer = service_with_secret("issuer-secret");
        let verifier = service_with_secret("verifier-secret");

        let token = issuer.generate_access_token(UserId::new(), "admin").unwrap();
        assert!(matches!(
            verifier.validate_token(&token),
            Err(JwtError::DecodingError(_))
        ));
    }

    #[test]
    fn test_expired_token_is_reported_as_expired() {
        let service = JwtService::new(JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expires_minutes: -10,
        });

        let token = service.generate_access_token(UserId::new(), "admin").unwrap();
        assert!(matches!(
            service.validate_token(&token),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let service = service_with_secret("test-secret");
        assert!(service.validate_token("invalid.token.here").is_err());
    }

    #[test]
    fn test_config_from_settings_converts_seconds_to_minutes() {
        let config = JwtConfig::from(&JwtSettings {
            secret: "s".to_string(),
            access_token_expiry_secs: 1800,
        });
        assert_eq!(config.access_token_expires_minutes, 30);
    }
}
