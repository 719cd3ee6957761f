//! Storage collaborators.
//!
//! Services receive an `Arc<dyn PostStore>` / `Arc<dyn UserStore>` at
//! construction. The Postgres implementations back the server and the CLI;
//! the in-memory ones (feature `test-utils`) let the whole request pipeline
//! run in tests without a database.

use async_trait::async_trait;
use uuid::Uuid;

use nofeed_db::StoreError;
use nofeed_models::{NewPost, Post, PostChanges, PostFilterParams, UserWithRole};

mod postgres;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

pub use postgres::{PgPostStore, PgUserStore};

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create(&self, post: NewPost) -> Result<Post, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Post>, StoreError>;

    /// Posts matching every given filter, newest first.
    async fn list(&self, filter: &PostFilterParams) -> Result<Vec<Post>, StoreError>;

    /// Applies `changes` to the post with `id` owned by `owner`. Returns `None`
    /// when no such row exists any more.
    async fn update(
        &self,
        id: Uuid,
        owner: &str,
        changes: &PostChanges,
    ) -> Result<Option<Post>, StoreError>;

    /// Deletes the post with `id` owned by `owner`. Returns whether a row went.
    async fn delete(&self, id: Uuid, owner: &str) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts the user row if it does not exist yet.
    async fn ensure_user(&self, subject: &str) -> Result<(), StoreError>;

    async fn role_of(&self, subject: &str) -> Result<Option<String>, StoreError>;

    /// Assigns `role` unless the user already holds one. Concurrent callers
    /// converge on a single assignment.
    async fn assign_role_if_absent(&self, subject: &str, role: &str) -> Result<(), StoreError>;

    /// Assigns `role`, replacing any existing assignment.
    async fn set_role(&self, subject: &str, role: &str) -> Result<(), StoreError>;

    async fn has_role(&self, subject: &str, role: &str) -> Result<bool, StoreError>;

    /// All users with their role, newest first.
    async fn list_users(&self) -> Result<Vec<UserWithRole>, StoreError>;

    /// Removes the user and their role assignment. Returns whether a user went.
    async fn delete_user(&self, subject: &str) -> Result<bool, StoreError>;
}
