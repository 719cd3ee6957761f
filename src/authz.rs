//! Role authorization over the local user table.

use std::sync::Arc;

use tracing::{debug, instrument};

use nofeed_auth::Principal;
use nofeed_db::StoreError;

use crate::store::UserStore;

#[derive(Clone)]
pub struct RoleAuthorizer {
    users: Arc<dyn UserStore>,
}

impl RoleAuthorizer {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Makes sure the subject has a user row and, if it holds no role yet,
    /// gives it `default_role`. An existing role is never changed. Safe to
    /// call on every request and from concurrent first requests.
    #[instrument(skip(self, principal), fields(subject = %principal.subject))]
    pub async fn ensure_default_role(
        &self,
        principal: &Principal,
        default_role: &str,
    ) -> Result<(), StoreError> {
        self.users.ensure_user(&principal.subject).await?;

        if self.users.role_of(&principal.subject).await?.is_none() {
            debug!(role = default_role, "assigning default role");
            self.users
                .assign_role_if_absent(&principal.subject, default_role)
                .await?;
        }
        Ok(())
    }

    /// Whether the subject currently holds `role`. A subject without any role
    /// row holds no role.
    #[instrument(skip(self, principal), fields(subject = %principal.subject))]
    pub async fn require_role(&self, principal: &Principal, role: &str) -> Result<bool, StoreError> {
        self.users.has_role(&principal.subject, role).await
    }
}
