use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;

use super::TOKEN_ALGORITHM;
use crate::config::SecurityConfig;
use crate::types::UserId;

/// Length of the `"Bearer "` scheme prefix. The resolver always skips exactly
/// this many bytes before handing the remainder to the JWT verifier.
pub const BEARER_PREFIX_LEN: usize = 7;

const BEARER_PREFIX: &str = "Bearer ";

/// Validated caller id, derived fresh for every request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity(UserId);

impl CallerIdentity {
    pub fn user_id(&self) -> UserId {
        self.0
    }
}

/// Credential rejection. The reason is for logs only; callers see a single
/// kind of failure regardless of what was wrong with the token.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    id: Option<Value>,
}

/// Turns an `Authorization` header value into a `CallerIdentity`
pub struct AuthResolver {
    decoding_key: DecodingKey,
    validation: Validation,
    secret_is_empty: bool,
}

impl AuthResolver {
    pub fn new(config: &SecurityConfig) -> Self {
        // Validation::new pins the accepted algorithm list to exactly one entry
        // and requires a valid `exp` claim.
        let validation = Validation::new(TOKEN_ALGORITHM);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            secret_is_empty: config.jwt_secret.is_empty(),
        }
    }

    /// Resolve `"Bearer <token>"` into the caller's user id
    pub fn resolve(&self, credential: &str) -> Result<CallerIdentity, AuthError> {
        if self.secret_is_empty {
            return Err(AuthError::Unauthorized("JWT secret not configured"));
        }

        let scheme = credential
            .get(..BEARER_PREFIX_LEN)
            .ok_or(AuthError::Unauthorized("credential shorter than bearer prefix"))?;
        if !scheme.eq_ignore_ascii_case(BEARER_PREFIX) {
            return Err(AuthError::Unauthorized("credential must use Bearer scheme"));
        }

        let token = &credential[BEARER_PREFIX_LEN..];
        if token.is_empty() {
            return Err(AuthError::Unauthorized("empty bearer token"));
        }

        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("JWT rejected: {}", e);
                AuthError::Unauthorized("invalid token")
            })?;

        let id = token_data
            .claims
            .id
            .as_ref()
            .and_then(coerce_user_id)
            .ok_or(AuthError::Unauthorized("id claim missing or not numeric"))?;

        Ok(CallerIdentity(id))
    }
}

/// Integer claims pass through; decimal strings are parsed. Everything else
/// (floats, booleans, non-positive ids) is rejected.
fn coerce_user_id(value: &Value) -> Option<UserId> {
    let id = match value {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    (id > 0).then_some(id)
}

#[cfg(test)]
impl CallerIdentity {
    pub fn for_tests(user_id: UserId) -> Self {
        Self(user_id)
    }
}
