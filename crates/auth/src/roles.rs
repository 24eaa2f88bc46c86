use serde::{Deserialize, Serialize};

/// Role granted to a session.
///
/// Kept as an open string so new roles never require a schema migration;
/// the well-known values have constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn user() -> Self {
        Self::new("user")
    }

    pub fn admin() -> Self {
        Self::new("admin")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        self.0 == "admin"
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
