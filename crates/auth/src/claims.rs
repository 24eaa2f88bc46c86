use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use billfold_core::UserId;

use crate::Role;

/// JWT claims model (transport-agnostic).
///
/// This is the minimal set of claims the application expects once a token
/// has been decoded/verified by whatever transport layer is in use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject / user identifier.
    pub sub: UserId,

    /// Email the session was established for.
    pub email: String,

    /// Role granted to the session.
    pub role: Role,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

impl JwtClaims {
    /// Claims for a fresh session starting at `now`.
    pub fn session(sub: UserId, email: impl Into<String>, role: Role, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub,
            email: email.into(),
            role,
            issued_at: now,
            expires_at: now + ttl,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Validate the claim time window against `now`.
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if claims.issued_at > now {
        return Err(TokenValidationError::NotYetValid);
    }
    if claims.expires_at <= now {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
