//! HS256 JWT implementation of `TokenProvider`.
//!
//! The payload carries only the user id plus the standard `iat`/`exp`
//! claims.

use chrono::{Duration, Utc};
use domains::{DomainError, DomainResult, TokenProvider};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    id: Uuid,
    iat: i64,
    exp: i64,
}

pub struct JwtTokenProvider {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtTokenProvider {
    /// Default token lifetime.
    pub const DEFAULT_TTL_DAYS: i64 = 30;

    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            ttl,
        }
    }
}

impl TokenProvider for JwtTokenProvider {
    fn issue(&self, user_id: Uuid) -> DomainResult<String> {
        let now = Utc::now();
        let claims = Claims {
            id: user_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| DomainError::Internal(format!("token signing failed: {err}")))
    }

    fn verify(&self, token: &str) -> DomainResult<Uuid> {
        match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => Ok(data.claims.id),
            Err(err) => {
                debug!(error = %err, "token rejected");
                let message = match err.kind() {
                    ErrorKind::ExpiredSignature => "Token expired",
                    _ => "Invalid token",
                };
                Err(DomainError::Unauthorized(message.into()))
            }
        }
    }
}
