use billfold_auth::Role;
use billfold_core::UserId;

/// Authenticated identity for a request.
///
/// This is immutable and must be present for all protected routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    user_id: UserId,
    email: String,
    role: Role,
}

impl CurrentUser {
    pub fn new(user_id: UserId, email: String, role: Role) -> Self {
        Self { user_id, email, role }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> &Role {
        &self.role
    }
}
