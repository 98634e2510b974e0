// Identity provider backed by configuration.

use super::models::UserIdentity;
use super::traits::IdentityProvider;

/// Reports a fixed user, or nobody.
pub struct StaticIdentity {
    user: Option<UserIdentity>,
}

impl StaticIdentity {
    pub fn new(user: Option<UserIdentity>) -> Self {
        Self { user }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<UserIdentity> {
        self.user.clone()
    }
}
