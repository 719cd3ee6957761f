//! Operations behind `nofeed-cli`.

use anyhow::anyhow;
use tracing::info;

use nofeed_core::roles;
use nofeed_db::StoreError;

use crate::store::UserStore;

/// Creates the user if needed and gives them `role`, replacing any role they
/// held. This is how the first superadmin comes to exist.
pub async fn set_role(users: &dyn UserStore, subject: &str, role: &str) -> anyhow::Result<()> {
    if subject.trim().is_empty() {
        return Err(anyhow!("auth0 user id must not be empty"));
    }
    if !roles::is_known(role) {
        return Err(anyhow!(
            "unknown role {:?}; expected one of {}",
            role,
            roles::ALL.join(", ")
        ));
    }

    users.ensure_user(subject).await?;
    users.set_role(subject, role).await.map_err(|e| match e {
        StoreError::UnknownRole(name) => anyhow!("role {:?} is missing from the database", name),
        other => other.into(),
    })?;

    info!(subject = %subject, role = %role, "role assigned");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryUserStore;

    #[tokio::test]
    async fn test_set_role_creates_user() {
        let users = MemoryUserStore::new();

        set_role(&users, "auth0|root", roles::SUPERADMIN).await.unwrap();

        assert_eq!(
            users.role_of("auth0|root").await.unwrap().as_deref(),
            Some(roles::SUPERADMIN)
        );
        assert_eq!(users.user_count(), 1);
    }

    #[tokio::test]
    async fn test_set_role_replaces_existing_role() {
        let users = MemoryUserStore::new();
        users.ensure_user("auth0|abc").await.unwrap();
        users.assign_role_if_absent("auth0|abc", roles::MEMBER).await.unwrap();

        set_role(&users, "auth0|abc", roles::SUPERADMIN).await.unwrap();

        assert!(users.has_role("auth0|abc", roles::SUPERADMIN).await.unwrap());
        assert_eq!(users.role_count(), 1);
    }

    #[tokio::test]
    async fn test_set_role_rejects_unknown_role() {
        let users = MemoryUserStore::new();

        let err = set_role(&users, "auth0|abc", "owner").await.unwrap_err();

        assert!(err.to_string().contains("unknown role"));
        assert_eq!(users.user_count(), 0);
    }

    #[tokio::test]
    async fn test_set_role_rejects_blank_subject() {
        let users = MemoryUserStore::new();
        assert!(set_role(&users, "  ", roles::MEMBER).await.is_err());
    }
}
