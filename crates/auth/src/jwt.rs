//! HS256 session tokens.
//!
//! Signing and validation are split into traits so HTTP middleware can take
//! a `dyn JwtValidator` without caring how tokens are minted.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};
use crate::roles::Role;

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("invalid token: {0}")]
    Invalid(String),

    #[error(transparent)]
    Window(#[from] TokenValidationError),
}

pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError>;
}

pub trait JwtSigner: Send + Sync {
    fn sign(&self, claims: &JwtClaims) -> Result<String, JwtError>;
}

/// Registered-claim wire shape (`iat`/`exp` in epoch seconds).
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: String,
    email: String,
    role: String,
    iat: i64,
    exp: i64,
}

/// HMAC-SHA256 signer/validator over a shared secret.
pub struct Hs256Jwt {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Hs256Jwt {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

impl core::fmt::Debug for Hs256Jwt {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256Jwt").finish_non_exhaustive()
    }
}

impl JwtSigner for Hs256Jwt {
    fn sign(&self, claims: &JwtClaims) -> Result<String, JwtError> {
        let wire = WireClaims {
            sub: claims.sub.to_string(),
            email: claims.email.clone(),
            role: claims.role.as_str().to_string(),
            iat: claims.issued_at.timestamp(),
            exp: claims.expires_at.timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &wire, &self.encoding)
            .map_err(|e| JwtError::Invalid(e.to_string()))
    }
}

impl JwtValidator for Hs256Jwt {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError> {
        // Window checks happen on our claims model below, against the caller's
        // clock, so disable the library's own expiry handling.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let decoded = jsonwebtoken::decode::<WireClaims>(token, &self.decoding, &validation)
            .map_err(|e| JwtError::Invalid(e.to_string()))?;
        let wire = decoded.claims;

        let sub = wire
            .sub
            .parse()
            .map_err(|_| JwtError::Invalid("malformed subject".to_string()))?;
        let issued_at = DateTime::<Utc>::from_timestamp(wire.iat, 0)
            .ok_or_else(|| JwtError::Invalid("malformed iat".to_string()))?;
        let expires_at = DateTime::<Utc>::from_timestamp(wire.exp, 0)
            .ok_or_else(|| JwtError::Invalid("malformed exp".to_string()))?;

        let claims = JwtClaims {
            sub,
            email: wire.email,
            role: Role::new(wire.role),
            issued_at,
            expires_at,
        };

        validate_claims(&claims, now)?;
        Ok(claims)
    }
}
