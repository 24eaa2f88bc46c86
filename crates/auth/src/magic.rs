//! Magic-link sign-in tokens.
//!
//! A token is a random 256-bit hex string mailed to the user; it is
//! single-use and expires 30 minutes after issue. Persistence and the
//! consume-exactly-once guarantee live in the store layer.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How long a sign-in link stays valid.
pub const MAGIC_TOKEN_TTL_MINUTES: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagicToken {
    pub token: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl MagicToken {
    /// Issue a fresh token for `email` at `now`.
    pub fn issue(email: &str, now: DateTime<Utc>) -> Self {
        Self {
            token: generate_token(),
            email: normalize_email(email),
            expires_at: now + Duration::minutes(MAGIC_TOKEN_TTL_MINUTES),
            used: false,
            created_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Unused and unexpired.
    pub fn is_consumable(&self, now: DateTime<Utc>) -> bool {
        !self.used && !self.is_expired(now)
    }
}

/// 256 bits of randomness, hex-encoded (64 chars).
pub fn generate_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// Canonical email form used for storage and lookups.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Shape check: `local@domain.tld`, no whitespace.
pub fn is_valid_email(raw: &str) -> bool {
    let s = raw.trim();
    if s.is_empty() || s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique_hex() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn token_expires_after_ttl() {
        let now = Utc::now();
        let token = MagicToken::issue("User@Example.com", now);

        assert_eq!(token.email, "user@example.com");
        assert!(token.is_consumable(now));
        assert!(token.is_consumable(now + Duration::minutes(29)));
        assert!(!token.is_consumable(now + Duration::minutes(30)));
    }

    #[test]
    fn used_token_is_not_consumable() {
        let now = Utc::now();
        let mut token = MagicToken::issue("user@example.com", now);
        token.used = true;
        assert!(!token.is_consumable(now));
    }

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("  padded@example.com "));
        assert!(!is_valid_email("missing-at.example.com"));
        assert!(!is_valid_email("no@tld"));
        assert!(!is_valid_email("spa ce@example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("a@"));
    }
}
