//! In-memory stores with the same observable behavior as the Postgres ones.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use nofeed_core::roles;
use nofeed_db::StoreError;
use nofeed_models::{NewPost, Post, PostChanges, PostFilterParams, UserWithRole};

use super::{PostStore, UserStore};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Default)]
pub struct MemoryPostStore {
    posts: Mutex<Vec<Post>>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.posts).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn create(&self, post: NewPost) -> Result<Post, StoreError> {
        let now = Utc::now();
        let created = Post {
            id: Uuid::new_v4(),
            title: post.title,
            content: post.content,
            auth0_user_id: post.auth0_user_id,
            slug: post.slug,
            published: post.published,
            created_at: now,
            updated_at: now,
        };
        lock(&self.posts).push(created.clone());
        Ok(created)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        Ok(lock(&self.posts).iter().find(|p| p.id == id).cloned())
    }

    async fn list(&self, filter: &PostFilterParams) -> Result<Vec<Post>, StoreError> {
        // Reverse insertion order first so equal timestamps still list newest first.
        let mut posts: Vec<Post> = lock(&self.posts)
            .iter()
            .rev()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn update(
        &self,
        id: Uuid,
        owner: &str,
        changes: &PostChanges,
    ) -> Result<Option<Post>, StoreError> {
        let mut posts = lock(&self.posts);
        let Some(post) = posts
            .iter_mut()
            .find(|p| p.id == id && p.auth0_user_id == owner)
        else {
            return Ok(None);
        };
        changes.apply(post);
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: Uuid, owner: &str) -> Result<bool, StoreError> {
        let mut posts = lock(&self.posts);
        let before = posts.len();
        posts.retain(|p| !(p.id == id && p.auth0_user_id == owner));
        Ok(posts.len() < before)
    }
}

#[derive(Default)]
struct UserTables {
    /// Insertion order doubles as creation order.
    users: Vec<(String, chrono::DateTime<Utc>)>,
    roles: HashMap<String, String>,
}

/// User store over the fixed role catalogue. `set_unavailable(true)` makes
/// every call fail the way an unreachable database does.
#[derive(Default)]
pub struct MemoryUserStore {
    tables: Mutex<UserTables>,
    unavailable: AtomicBool,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn user_count(&self) -> usize {
        lock(&self.tables).users.len()
    }

    pub fn role_count(&self) -> usize {
        lock(&self.tables).roles.len()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn known_role(role: &str) -> Result<(), StoreError> {
        if roles::is_known(role) {
            Ok(())
        } else {
            Err(StoreError::UnknownRole(role.to_string()))
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn ensure_user(&self, subject: &str) -> Result<(), StoreError> {
        self.check()?;
        let mut tables = lock(&self.tables);
        if !tables.users.iter().any(|(id, _)| id == subject) {
            tables.users.push((subject.to_string(), Utc::now()));
        }
        Ok(())
    }

    async fn role_of(&self, subject: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        Ok(lock(&self.tables).roles.get(subject).cloned())
    }

    async fn assign_role_if_absent(&self, subject: &str, role: &str) -> Result<(), StoreError> {
        self.check()?;
        Self::known_role(role)?;
        let mut tables = lock(&self.tables);
        if !tables.users.iter().any(|(id, _)| id == subject) {
            return Err(StoreError::NotFound);
        }
        tables
            .roles
            .entry(subject.to_string())
            .or_insert_with(|| role.to_string());
        Ok(())
    }

    async fn set_role(&self, subject: &str, role: &str) -> Result<(), StoreError> {
        self.check()?;
        Self::known_role(role)?;
        let mut tables = lock(&self.tables);
        if !tables.users.iter().any(|(id, _)| id == subject) {
            return Err(StoreError::NotFound);
        }
        tables.roles.insert(subject.to_string(), role.to_string());
        Ok(())
    }

    async fn has_role(&self, subject: &str, role: &str) -> Result<bool, StoreError> {
        self.check()?;
        Ok(lock(&self.tables)
            .roles
            .get(subject)
            .is_some_and(|assigned| assigned == role))
    }

    async fn list_users(&self) -> Result<Vec<UserWithRole>, StoreError> {
        self.check()?;
        let tables = lock(&self.tables);
        Ok(tables
            .users
            .iter()
            .rev()
            .map(|(id, created_at)| UserWithRole {
                auth0_user_id: id.clone(),
                role: tables.roles.get(id).cloned(),
                created_at: *created_at,
            })
            .collect())
    }

    async fn delete_user(&self, subject: &str) -> Result<bool, StoreError> {
        self.check()?;
        let mut tables = lock(&self.tables);
        let before = tables.users.len();
        tables.users.retain(|(id, _)| id != subject);
        tables.roles.remove(subject);
        Ok(tables.users.len() < before)
    }
}
