use std::sync::Arc;

use anyhow::anyhow;
use tracing::{info, instrument};

use nofeed_core::{AppError, roles};
use nofeed_db::StoreError;

use crate::modules::admin::model::UserWithRole;
use crate::store::UserStore;

fn user_not_found() -> AppError {
    AppError::not_found(anyhow!("User not found"))
}

/// User and role management for superadmins.
#[derive(Clone)]
pub struct AdminService {
    users: Arc<dyn UserStore>,
}

impl AdminService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<UserWithRole>, AppError> {
        Ok(self.users.list_users().await?)
    }

    /// Registers a user ahead of their first login, with the default role.
    /// Registering an existing user changes nothing.
    #[instrument(skip(self))]
    pub async fn create_user(&self, subject: &str) -> Result<(), AppError> {
        self.users.ensure_user(subject).await?;
        self.users
            .assign_role_if_absent(subject, roles::DEFAULT)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn set_role(&self, subject: &str, role: &str) -> Result<(), AppError> {
        match self.users.set_role(subject, role).await {
            Ok(()) => {
                info!(role, "role assigned");
                Ok(())
            }
            Err(StoreError::NotFound) => Err(user_not_found()),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, subject: &str) -> Result<(), AppError> {
        if !self.users.delete_user(subject).await? {
            return Err(user_not_found());
        }
        info!("user deleted");
        Ok(())
    }
}
