//! Role names of the fixed role catalogue.
//!
//! The `roles` table is seeded with exactly these names by the initial
//! migration. Use the constants instead of string literals when checking or
//! assigning roles.
//!
//! # Example
//!
//! ```ignore
//! use nofeed_core::roles;
//!
//! authorizer.require_role(&principal.subject, roles::SUPERADMIN).await?;
//! ```

/// Regular authenticated user; may manage their own posts.
pub const MEMBER: &str = "member";
/// Full access to the admin user-management surface.
pub const SUPERADMIN: &str = "superadmin";

/// Role given to a user on their first authenticated request.
pub const DEFAULT: &str = MEMBER;

/// Every role name known to the catalogue.
pub const ALL: &[&str] = &[MEMBER, SUPERADMIN];

pub fn is_known(name: &str) -> bool {
    ALL.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_roles() {
        assert!(is_known("member"));
        assert!(is_known("superadmin"));
        assert!(!is_known("admin"));
        assert!(!is_known(""));
    }
}
