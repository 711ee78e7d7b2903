use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::config::SecurityConfig;
use crate::types::UserId;

pub mod password;
pub mod resolver;

pub use resolver::{AuthError, AuthResolver, CallerIdentity};

/// The only algorithm tokens are signed and verified with
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: UserId,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(id: UserId, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            id,
            iat: now.timestamp(),
            exp,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,
}

/// Signs login tokens. Built once from `SecurityConfig`.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    expiry_hours: u64,
    secret_is_empty: bool,
}

impl TokenIssuer {
    pub fn new(config: &SecurityConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            expiry_hours: config.jwt_expiry_hours,
            secret_is_empty: config.jwt_secret.is_empty(),
        }
    }

    pub fn expires_in_secs(&self) -> u64 {
        self.expiry_hours * 3600
    }

    pub fn issue(&self, user_id: UserId) -> Result<String, JwtError> {
        if self.secret_is_empty {
            return Err(JwtError::InvalidSecret);
        }

        let claims = Claims::new(user_id, self.expiry_hours);
        encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn security(secret: &str) -> SecurityConfig {
        SecurityConfig {
            jwt_secret: secret.to_string(),
            jwt_expiry_hours: 1,
            enable_cors: false,
            cors_origins: vec![],
            enable_audit_logging: false,
        }
    }

    #[test]
    fn claims_expire_after_configured_hours() {
        let claims = Claims::new(3, 2);
        assert_eq!(claims.exp - claims.iat, 2 * 3600);
    }

    #[test]
    fn issuer_refuses_empty_secret() {
        let issuer = TokenIssuer::new(&security(""));
        assert!(matches!(issuer.issue(1), Err(JwtError::InvalidSecret)));
    }

    #[test]
    fn issued_token_resolves_to_same_user() {
        let config = security("unit-test-secret");
        let token = TokenIssuer::new(&config).issue(42).unwrap();
        let caller = AuthResolver::new(&config)
            .resolve(&format!("Bearer {}", token))
            .unwrap();
        assert_eq!(caller.user_id(), 42);
    }
}
