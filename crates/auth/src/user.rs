//! User record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use billfold_core::{Entity, UserId};

use crate::Role;

/// An account, created implicitly on first verified sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    /// Unique, stored lowercased and trimmed.
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub role: Role,
    pub email_verified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            email: crate::magic::normalize_email(email),
            name: None,
            image: None,
            role: Role::user(),
            email_verified: None,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Stamp a verified sign-in.
    pub fn record_login(&mut self, now: DateTime<Utc>) {
        self.email_verified = Some(now);
        self.last_login = Some(now);
        self.updated_at = now;
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_starts_unverified() {
        let now = Utc::now();
        let user = User::new("Someone@Example.com", now);
        assert_eq!(user.email, "someone@example.com");
        assert_eq!(user.role, Role::user());
        assert!(user.email_verified.is_none());
    }

    #[test]
    fn login_stamps_verification_and_last_login() {
        let now = Utc::now();
        let mut user = User::new("a@b.co", now);
        let later = now + chrono::Duration::hours(1);

        user.record_login(later);
        assert_eq!(user.email_verified, Some(later));
        assert_eq!(user.last_login, Some(later));
        assert_eq!(user.updated_at, later);
    }
}
